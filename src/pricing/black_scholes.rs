use super::{OptionSide, PricingParameters};
use statrs::distribution::{ContinuousCDF, Normal};

/// Black-Scholes-Merton closed form with continuous dividend yield.
///
/// d1 = (ln(S/K) + (r - q + sigma^2/2)*T) / (sigma * sqrt(T))
/// d2 = d1 - sigma * sqrt(T)
///
/// Call = S*e^(-qT)*Phi(d1) - K*e^(-rT)*Phi(d2)
/// Put  = K*e^(-rT)*Phi(-d2) - S*e^(-qT)*Phi(-d1)
///
/// Prices are rounded to 3 decimals so stored and displayed values agree
/// across every caller.
pub struct BlackScholes {
    /// Standard normal distribution (created once, reused)
    normal: Normal,
}

impl BlackScholes {
    pub fn new() -> Self {
        Self {
            normal: Normal::standard(),
        }
    }

    /// Pure function: theoretical price for the side carried by `params`.
    /// Domain validity (S, K, T, sigma > 0) is enforced by the
    /// `PricingParameters` constructor and not re-checked here.
    #[inline]
    pub fn price(&self, params: &PricingParameters) -> f64 {
        let s = params.underlying;
        let k = params.strike;
        let t = params.maturity_years;
        let r = params.risk_free_rate;
        let sigma = params.volatility;
        let q = params.dividend_yield;

        let sigma_sqrt_t = sigma * t.sqrt();
        let d1 = ((s / k).ln() + (r - q + 0.5 * sigma * sigma) * t) / sigma_sqrt_t;
        let d2 = d1 - sigma_sqrt_t;

        let discounted_spot = s * (-q * t).exp();
        let discounted_strike = k * (-r * t).exp();

        let price = match params.side {
            OptionSide::Call => {
                discounted_spot * self.normal.cdf(d1) - discounted_strike * self.normal.cdf(d2)
            }
            OptionSide::Put => {
                discounted_strike * self.normal.cdf(-d2) - discounted_spot * self.normal.cdf(-d1)
            }
        };

        round3(price)
    }
}

impl Default for BlackScholes {
    fn default() -> Self {
        Self::new()
    }
}

/// 3-decimal presentation rounding shared by point quotes and curve points.
#[inline]
pub(crate) fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atm_params(side: OptionSide) -> PricingParameters {
        PricingParameters::new(100.0, 100.0, 1.0, 0.05, 0.2, 0.0, side).unwrap()
    }

    #[test]
    fn test_known_atm_values() {
        let engine = BlackScholes::new();
        let call = engine.price(&atm_params(OptionSide::Call));
        let put = engine.price(&atm_params(OptionSide::Put));
        // Textbook values for S=K=100, T=1, r=5%, sigma=20%, q=0
        assert!((call - 10.4506).abs() < 2e-3, "call={call}");
        assert!((put - 5.5735).abs() < 2e-3, "put={put}");
    }

    #[test]
    fn test_put_call_parity() {
        let engine = BlackScholes::new();
        let call = engine.price(&atm_params(OptionSide::Call));
        let put = engine.price(&atm_params(OptionSide::Put));
        // C - P = S - K*e^(-rT) when q = 0
        let forward = 100.0 - 100.0 * (-0.05_f64).exp();
        assert!(
            (call - put - forward).abs() < 1e-3,
            "parity violated: C-P={} expected {forward}",
            call - put
        );
    }

    #[test]
    fn test_vanishing_vol_converges_to_discounted_intrinsic() {
        let engine = BlackScholes::new();
        let p =
            PricingParameters::new(110.0, 100.0, 1.0, 0.05, 1e-4, 0.01, OptionSide::Call).unwrap();
        let call = engine.price(&p);
        let intrinsic = 110.0 * (-0.01_f64).exp() - 100.0 * (-0.05_f64).exp();
        assert!(
            (call - intrinsic).abs() < 1e-3,
            "call={call} intrinsic={intrinsic}"
        );
    }

    #[test]
    fn test_call_non_decreasing_in_maturity() {
        let engine = BlackScholes::new();
        let mut prev = 0.0;
        for t in [0.25, 0.5, 1.0, 2.0, 5.0] {
            let p =
                PricingParameters::new(100.0, 105.0, t, 0.05, 0.2, 0.01, OptionSide::Call).unwrap();
            let price = engine.price(&p);
            assert!(
                price >= prev,
                "call price decreased at T={t}: {price} < {prev}"
            );
            prev = price;
        }
    }

    #[test]
    fn test_prices_carry_three_decimals() {
        let engine = BlackScholes::new();
        for side in [OptionSide::Call, OptionSide::Put] {
            let price = engine.price(&atm_params(side));
            assert_eq!(price, round3(price), "{side} price not rounded: {price}");
        }
    }

    #[test]
    fn test_deep_itm_put_worth_more_than_call() {
        let engine = BlackScholes::new();
        let base = PricingParameters::new(60.0, 100.0, 0.5, 0.03, 0.25, 0.0, OptionSide::Call)
            .unwrap();
        let call = engine.price(&base);
        let put = engine.price(&base.with_side(OptionSide::Put));
        assert!(put > call, "S<<K should favor the put: put={put} call={call}");
        assert!(call >= 0.0 && put >= 0.0);
    }
}
