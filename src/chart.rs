use crate::errors::{PricerError, PricerResult};
use crate::feeds::yahoo::ClosePoint;
use crate::pricing::curve::PriceCurve;
use plotters::prelude::*;

const CHART_SIZE: (u32, u32) = (1280, 720);

/// Render the call/put sweep as an SVG chart. The x-axis is the sweep's
/// underlying-price order.
pub fn render_curve_svg(ticker: &str, curve: &PriceCurve) -> PricerResult<String> {
    let first = curve
        .points
        .first()
        .ok_or_else(|| PricerError::Chart("empty curve".into()))?;
    let x_min = first.underlying;
    let x_max = curve
        .points
        .last()
        .map(|p| p.underlying)
        .unwrap_or(x_min)
        .max(x_min + 1.0);

    let y_max = curve
        .points
        .iter()
        .map(|p| p.call.max(p.put))
        .fold(f64::NEG_INFINITY, f64::max);
    let y_pad = (y_max * 0.05).max(1.0);

    let calls: Vec<(f64, f64)> = curve.points.iter().map(|p| (p.underlying, p.call)).collect();
    let puts: Vec<(f64, f64)> = curve.points.iter().map(|p| (p.underlying, p.put)).collect();

    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption(
                format!("{ticker} Black-Scholes Option Prices"),
                ("sans-serif", 30),
            )
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, 0.0..y_max + y_pad)
            .map_err(chart_error)?;

        chart
            .configure_mesh()
            .x_desc("Stock Price")
            .y_desc("Option Price")
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(std::iter::once(PathElement::new(calls, RED.stroke_width(2))))
            .map_err(chart_error)?
            .label("Call Option Price")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

        chart
            .draw_series(std::iter::once(PathElement::new(puts, BLUE.stroke_width(2))))
            .map_err(chart_error)?
            .label("Put Option Price")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }

    Ok(buf)
}

/// Render a close-price history series as an SVG chart. The x-axis is
/// days since the first observation.
pub fn render_history_svg(
    ticker: &str,
    period: &str,
    series: &[ClosePoint],
) -> PricerResult<String> {
    let first = series
        .first()
        .ok_or_else(|| PricerError::Chart("empty price history".into()))?;

    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|p| ((p.timestamp - first.timestamp) as f64 / 86_400.0, p.close))
        .collect();

    let x_max = points.last().map(|(d, _)| *d).unwrap_or(0.0).max(1e-6);
    let y_min = series.iter().map(|p| p.close).fold(f64::INFINITY, f64::min);
    let y_max = series
        .iter()
        .map(|p| p.close)
        .fold(f64::NEG_INFINITY, f64::max);
    let y_pad = ((y_max - y_min) * 0.05).max(1e-6);

    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption(
                format!("{ticker} Price History ({period})"),
                ("sans-serif", 30),
            )
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0.0..x_max, (y_min - y_pad)..(y_max + y_pad))
            .map_err(chart_error)?;

        chart
            .configure_mesh()
            .x_desc("Days")
            .y_desc("Price")
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(std::iter::once(PathElement::new(
                points,
                BLUE.stroke_width(2),
            )))
            .map_err(chart_error)?
            .label("Close Price")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }

    Ok(buf)
}

fn chart_error<E: std::fmt::Display>(e: E) -> PricerError {
    PricerError::Chart(e.to_string())
}
