pub mod black_scholes;
pub mod curve;

pub use black_scholes::BlackScholes;

use crate::errors::{PricerError, PricerResult};

/// Contract side. Anything other than "call"/"put" is rejected at the
/// parse boundary, before a price is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSide {
    Call,
    Put,
}

impl std::str::FromStr for OptionSide {
    type Err = PricerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(Self::Call),
            "put" => Ok(Self::Put),
            other => Err(PricerError::InvalidOptionSide(other.to_string())),
        }
    }
}

impl std::fmt::Display for OptionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// Complete input to one pricing evaluation. Stack-allocated, Copy.
///
/// Construction is the domain gate: S, K, T and sigma must be positive and
/// finite, the dividend yield non-negative, the rate finite (negative rates
/// are allowed). The engine trusts these checks and does not repeat them.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct PricingParameters {
    pub underlying: f64,
    pub strike: f64,
    pub maturity_years: f64,
    pub risk_free_rate: f64,
    pub volatility: f64,
    pub dividend_yield: f64,
    pub side: OptionSide,
}

impl PricingParameters {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        underlying: f64,
        strike: f64,
        maturity_years: f64,
        risk_free_rate: f64,
        volatility: f64,
        dividend_yield: f64,
        side: OptionSide,
    ) -> PricerResult<Self> {
        require_positive("underlying price", underlying)?;
        require_positive("strike price", strike)?;
        require_positive("maturity", maturity_years)?;
        require_positive("volatility", volatility)?;
        if !risk_free_rate.is_finite() {
            return Err(PricerError::Domain(format!(
                "risk-free rate must be finite, got {risk_free_rate}"
            )));
        }
        if !dividend_yield.is_finite() || dividend_yield < 0.0 {
            return Err(PricerError::Domain(format!(
                "dividend yield must be non-negative, got {dividend_yield}"
            )));
        }

        Ok(Self {
            underlying,
            strike,
            maturity_years,
            risk_free_rate,
            volatility,
            dividend_yield,
            side,
        })
    }

    /// Same market and contract fields, different side.
    #[inline]
    pub fn with_side(mut self, side: OptionSide) -> Self {
        self.side = side;
        self
    }

    /// Same contract fields, different underlying. Used by the curve sweep,
    /// which guarantees positivity of the substituted price itself.
    #[inline]
    pub fn with_underlying(mut self, underlying: f64) -> Self {
        self.underlying = underlying;
        self
    }
}

fn require_positive(field: &str, value: f64) -> PricerResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PricerError::Domain(format!(
            "{field} must be a positive finite number, got {value}"
        )));
    }
    Ok(())
}
