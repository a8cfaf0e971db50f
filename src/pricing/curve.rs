use super::black_scholes::BlackScholes;
use super::{OptionSide, PricingParameters};
use crate::errors::{PricerError, PricerResult};

/// One sweep sample: both sides priced at the same underlying.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct CurvePoint {
    pub underlying: f64,
    pub call: f64,
    pub put: f64,
}

/// Price-sensitivity sweep over the underlying, ascending. The order is
/// the x-axis of the chart consumer and is significant.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PriceCurve {
    pub points: Vec<CurvePoint>,
}

/// Sweep the engine over integer underlying prices in [low, high]
/// inclusive, all other fields taken from `base`. Each point matches a
/// direct engine call with the substituted underlying.
pub fn generate(
    engine: &BlackScholes,
    base: &PricingParameters,
    low: u32,
    high: u32,
) -> PricerResult<PriceCurve> {
    if low == 0 {
        return Err(PricerError::Domain(
            "curve lower bound must be positive".into(),
        ));
    }
    if low > high {
        return Err(PricerError::Domain(format!(
            "curve bounds inverted: {low} > {high}"
        )));
    }

    let mut points = Vec::with_capacity((high - low + 1) as usize);
    for s in low..=high {
        let at = base.with_underlying(f64::from(s));
        points.push(CurvePoint {
            underlying: f64::from(s),
            call: engine.price(&at.with_side(OptionSide::Call)),
            put: engine.price(&at.with_side(OptionSide::Put)),
        });
    }

    Ok(PriceCurve { points })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PricingParameters {
        PricingParameters::new(100.0, 100.0, 1.0, 0.05, 0.2, 0.01, OptionSide::Call).unwrap()
    }

    #[test]
    fn test_curve_covers_inclusive_range_ascending() {
        let engine = BlackScholes::new();
        let curve = generate(&engine, &base(), 50, 150).unwrap();
        assert_eq!(curve.points.len(), 101);
        assert_eq!(curve.points[0].underlying, 50.0);
        assert_eq!(curve.points[100].underlying, 150.0);
        for pair in curve.points.windows(2) {
            assert!(pair[0].underlying < pair[1].underlying, "not ascending");
        }
    }

    #[test]
    fn test_curve_points_match_direct_engine_calls() {
        let engine = BlackScholes::new();
        let base = base();
        let curve = generate(&engine, &base, 80, 120).unwrap();
        for point in &curve.points {
            let at = base.with_underlying(point.underlying);
            assert_eq!(point.call, engine.price(&at.with_side(OptionSide::Call)));
            assert_eq!(point.put, engine.price(&at.with_side(OptionSide::Put)));
        }
    }

    #[test]
    fn test_single_point_range() {
        let engine = BlackScholes::new();
        let curve = generate(&engine, &base(), 100, 100).unwrap();
        assert_eq!(curve.points.len(), 1);
        assert_eq!(curve.points[0].underlying, 100.0);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let engine = BlackScholes::new();
        let err = generate(&engine, &base(), 150, 50).unwrap_err();
        assert!(matches!(err, PricerError::Domain(_)), "got {err}");
    }

    #[test]
    fn test_zero_lower_bound_rejected() {
        let engine = BlackScholes::new();
        let err = generate(&engine, &base(), 0, 50).unwrap_err();
        assert!(matches!(err, PricerError::Domain(_)), "got {err}");
    }

    #[test]
    fn test_call_increases_put_decreases_along_sweep() {
        let engine = BlackScholes::new();
        let curve = generate(&engine, &base(), 50, 150).unwrap();
        let first = curve.points.first().unwrap();
        let last = curve.points.last().unwrap();
        assert!(last.call > first.call, "call should rise with the underlying");
        assert!(last.put < first.put, "put should fall with the underlying");
    }
}
