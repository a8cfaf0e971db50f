use crate::errors::{PricerError, PricerResult};
use crate::pricing::OptionSide;

/// Periods the history endpoints accept, matching the quote provider's
/// range parameter.
pub const HISTORY_PERIODS: [&str; 8] = ["1d", "5d", "1mo", "6mo", "ytd", "1y", "5y", "max"];

/// Raw user-entered pricing fields, as strings off the wire. The rate and
/// volatility arrive as percentages; maturity as years, decimal years or a
/// fraction of years.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RawQuoteRequest {
    pub ticker: String,
    pub spot: String,
    pub strike: String,
    pub maturity: String,
    pub rate: String,
    pub volatility: String,
    /// Optional single side of interest; both sides are always priced.
    #[serde(default)]
    pub side: Option<String>,
}

/// Normalized numeric inputs, before the dividend yield is attached by
/// the market-data feed.
#[derive(Debug, Clone, Copy)]
pub struct NormalizedInputs {
    pub spot: f64,
    pub strike: f64,
    pub maturity_years: f64,
    pub risk_free_rate: f64,
    pub volatility: f64,
    pub side: Option<OptionSide>,
}

impl RawQuoteRequest {
    /// Apply the full coercion rules: ticker format, finite numerics,
    /// maturity-as-fraction, percent-to-decimal. Positivity of the result
    /// is enforced by `PricingParameters::new` downstream.
    pub fn normalize(&self) -> PricerResult<(String, NormalizedInputs)> {
        let ticker = validate_ticker(&self.ticker)?;
        let side = match self.side.as_deref() {
            Some(s) => Some(s.parse::<OptionSide>()?),
            None => None,
        };
        Ok((
            ticker,
            NormalizedInputs {
                spot: parse_numeric("spot price", &self.spot)?,
                strike: parse_numeric("strike price", &self.strike)?,
                maturity_years: parse_maturity(&self.maturity)?,
                risk_free_rate: parse_percent("risk-free rate", &self.rate)?,
                volatility: parse_percent("volatility", &self.volatility)?,
                side,
            },
        ))
    }
}

/// Ticker symbols are ASCII letters and digits only. Returns the
/// normalized (uppercased) symbol.
pub fn validate_ticker(raw: &str) -> PricerResult<String> {
    let ticker = raw.trim();
    if ticker.is_empty() || !ticker.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(PricerError::Domain(format!(
            "invalid ticker {raw:?}: letters and digits only"
        )));
    }
    Ok(ticker.to_ascii_uppercase())
}

/// Parse a raw field into a finite f64.
pub fn parse_numeric(field: &str, raw: &str) -> PricerResult<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| PricerError::Domain(format!("{field} must be a number, got {raw:?}")))?;
    if !value.is_finite() {
        return Err(PricerError::Domain(format!(
            "{field} must be finite, got {raw:?}"
        )));
    }
    Ok(value)
}

/// Rate and volatility are entered as percentages ("5" means 5%).
pub fn parse_percent(field: &str, raw: &str) -> PricerResult<f64> {
    Ok(parse_numeric(field, raw)? / 100.0)
}

/// Maturity accepts integer years ("1"), decimal years ("0.5") or a
/// fraction of years ("1/2"). Sign is preserved so a non-positive maturity
/// is rejected by the parameter constructor, not masked here.
pub fn parse_maturity(raw: &str) -> PricerResult<f64> {
    let s = raw.trim();
    if let Some((numerator, denominator)) = s.split_once('/') {
        let n: i64 = numerator.trim().parse().map_err(|_| maturity_error(raw))?;
        let d: i64 = denominator.trim().parse().map_err(|_| maturity_error(raw))?;
        if d == 0 {
            return Err(PricerError::Domain(format!(
                "maturity {raw:?} divides by zero"
            )));
        }
        return Ok(n as f64 / d as f64);
    }
    parse_numeric("maturity", s)
}

fn maturity_error(raw: &str) -> PricerError {
    PricerError::Domain(format!(
        "maturity must be years or a fraction like \"1/2\", got {raw:?}"
    ))
}

/// History periods are whitelisted; anything else is a caller error.
pub fn validate_period(raw: &str) -> PricerResult<&'static str> {
    for period in HISTORY_PERIODS {
        if period == raw {
            return Ok(period);
        }
    }
    Err(PricerError::Domain(format!(
        "unknown period {raw:?}, expected one of {HISTORY_PERIODS:?}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{OptionSide, PricingParameters};

    #[test]
    fn test_ticker_accepts_alphanumerics() {
        assert_eq!(validate_ticker("AAPL").unwrap(), "AAPL");
        assert_eq!(validate_ticker("BRK2").unwrap(), "BRK2");
        assert_eq!(validate_ticker("msft").unwrap(), "MSFT");
    }

    #[test]
    fn test_ticker_rejects_punctuation_spaces_and_empty() {
        for bad in ["BRK.B", "", "AA PL", "SPY!", "  "] {
            assert!(
                validate_ticker(bad).is_err(),
                "ticker {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_maturity_accepts_integer_decimal_and_fraction() {
        assert_eq!(parse_maturity("1").unwrap(), 1.0);
        assert_eq!(parse_maturity("0.5").unwrap(), 0.5);
        assert_eq!(parse_maturity("1/2").unwrap(), 0.5);
        assert_eq!(parse_maturity("3/12").unwrap(), 0.25);
    }

    #[test]
    fn test_maturity_rejects_garbage() {
        for bad in ["abc", "1/0", "one/2", "1/2/3", ""] {
            assert!(
                parse_maturity(bad).is_err(),
                "maturity {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_negative_fraction_maturity_fails_at_construction() {
        let t = parse_maturity("-1/2").unwrap();
        assert_eq!(t, -0.5);
        let res = PricingParameters::new(100.0, 100.0, t, 0.05, 0.2, 0.0, OptionSide::Call);
        assert!(matches!(res, Err(PricerError::Domain(_))));
    }

    #[test]
    fn test_percent_fields_divide_by_hundred() {
        assert_eq!(parse_percent("rate", "5").unwrap(), 0.05);
        assert_eq!(parse_percent("vol", "20").unwrap(), 0.2);
    }

    #[test]
    fn test_numeric_rejects_non_finite_and_garbage() {
        assert!(parse_numeric("spot", "abc").is_err());
        assert!(parse_numeric("spot", "NaN").is_err());
        assert!(parse_numeric("spot", "inf").is_err());
        assert_eq!(parse_numeric("spot", " 101.5 ").unwrap(), 101.5);
    }

    #[test]
    fn test_normalize_full_request() {
        let req = RawQuoteRequest {
            ticker: "aapl".into(),
            spot: "100".into(),
            strike: "105".into(),
            maturity: "1/2".into(),
            rate: "5".into(),
            volatility: "20".into(),
            side: Some("put".into()),
        };
        let (ticker, inputs) = req.normalize().unwrap();
        assert_eq!(ticker, "AAPL");
        assert_eq!(inputs.spot, 100.0);
        assert_eq!(inputs.strike, 105.0);
        assert_eq!(inputs.maturity_years, 0.5);
        assert_eq!(inputs.risk_free_rate, 0.05);
        assert_eq!(inputs.volatility, 0.2);
        assert_eq!(inputs.side, Some(OptionSide::Put));
    }

    #[test]
    fn test_normalize_rejects_bad_side() {
        let req = RawQuoteRequest {
            ticker: "AAPL".into(),
            spot: "100".into(),
            strike: "105".into(),
            maturity: "1".into(),
            rate: "5".into(),
            volatility: "20".into(),
            side: Some("butterfly".into()),
        };
        let err = req.normalize().unwrap_err();
        assert!(matches!(err, PricerError::InvalidOptionSide(_)), "got {err}");
    }

    #[test]
    fn test_period_whitelist() {
        assert_eq!(validate_period("1d").unwrap(), "1d");
        assert_eq!(validate_period("max").unwrap(), "max");
        assert!(validate_period("2w").is_err());
        assert!(validate_period("").is_err());
    }
}
