use crate::chart;
use crate::db;
use crate::errors::PricerResult;
use crate::pricing::curve::{self, PriceCurve};
use crate::pricing::{OptionSide, PricingParameters};
use crate::state::{AppState, DbCommand};
use crate::validation::{self, RawQuoteRequest};
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use portable_atomic::Ordering::Relaxed;
use std::sync::Arc;

#[derive(serde::Deserialize)]
pub struct CurveRequest {
    #[serde(flatten)]
    pub quote: RawQuoteRequest,
    pub low_price: Option<u32>,
    pub high_price: Option<u32>,
}

#[derive(serde::Deserialize)]
pub struct HistoryQuery {
    pub period: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct QuotesQuery {
    pub ticker: Option<String>,
    pub limit: Option<usize>,
}

/// GET /api/health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// POST /api/price -- validate, fetch dividend yield, price both sides,
/// persist the quote.
pub async fn post_price(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RawQuoteRequest>,
) -> Json<serde_json::Value> {
    match price_request(&state, &req).await {
        Ok(body) => Json(body),
        Err(e) => {
            tracing::warn!(error = %e, "price request failed");
            Json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

async fn price_request(
    state: &AppState,
    req: &RawQuoteRequest,
) -> PricerResult<serde_json::Value> {
    let (ticker, base, requested_side) = build_parameters(state, req).await?;

    let call = state.engine.price(&base.with_side(OptionSide::Call));
    let put = state.engine.price(&base.with_side(OptionSide::Put));
    state.counters.quotes_priced.fetch_add(1, Relaxed);

    let id = uuid::Uuid::new_v4().to_string();
    let created_at = chrono::Utc::now().to_rfc3339();
    let _ = state
        .db_tx
        .send(DbCommand::InsertQuote {
            id: id.clone(),
            created_at: created_at.clone(),
            ticker: ticker.clone(),
            spot: base.underlying,
            strike: base.strike,
            maturity_years: base.maturity_years,
            risk_free_rate: base.risk_free_rate,
            volatility: base.volatility,
            dividend_yield: base.dividend_yield,
            call_price: call,
            put_price: put,
        })
        .await;

    tracing::info!(ticker = %ticker, call = call, put = put, "quote priced");

    let mut body = serde_json::json!({
        "id": id,
        "created_at": created_at,
        "ticker": ticker,
        "spot": base.underlying,
        "strike": base.strike,
        "maturity_years": base.maturity_years,
        "risk_free_rate": base.risk_free_rate,
        "volatility": base.volatility,
        "dividend_yield": base.dividend_yield,
        "call_price": call,
        "put_price": put,
    });
    if let Some(side) = requested_side {
        let price = match side {
            OptionSide::Call => call,
            OptionSide::Put => put,
        };
        body["side"] = serde_json::json!(side);
        body["price"] = serde_json::json!(price);
    }
    Ok(body)
}

/// POST /api/curve -- the price-sensitivity sweep as JSON.
pub async fn post_curve(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CurveRequest>,
) -> Json<serde_json::Value> {
    match curve_request(&state, &req).await {
        Ok((ticker, curve)) => Json(serde_json::json!({
            "ticker": ticker,
            "points": curve.points,
        })),
        Err(e) => {
            tracing::warn!(error = %e, "curve request failed");
            Json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

/// POST /api/curve/svg -- the sweep rendered as a chart.
pub async fn post_curve_svg(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CurveRequest>,
) -> Response {
    let rendered = match curve_request(&state, &req).await {
        Ok((ticker, curve)) => chart::render_curve_svg(&ticker, &curve),
        Err(e) => Err(e),
    };
    match rendered {
        Ok(svg) => {
            state.counters.charts_rendered.fetch_add(1, Relaxed);
            ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "curve chart failed");
            Json(serde_json::json!({ "error": e.to_string() })).into_response()
        }
    }
}

async fn curve_request(
    state: &AppState,
    req: &CurveRequest,
) -> PricerResult<(String, PriceCurve)> {
    let (ticker, base, _) = build_parameters(state, &req.quote).await?;

    let low = req.low_price.unwrap_or(state.config.curve_low_price);
    let high = req.high_price.unwrap_or(state.config.curve_high_price);
    let curve = curve::generate(&state.engine, &base, low, high)?;
    state.counters.curves_generated.fetch_add(1, Relaxed);

    Ok((ticker, curve))
}

/// Shared request plumbing: normalize raw fields, fetch the dividend
/// yield, construct checked parameters.
async fn build_parameters(
    state: &AppState,
    req: &RawQuoteRequest,
) -> PricerResult<(String, PricingParameters, Option<OptionSide>)> {
    let (ticker, inputs) = match req.normalize() {
        Ok(v) => v,
        Err(e) => {
            state.counters.validation_rejects.fetch_add(1, Relaxed);
            return Err(e);
        }
    };

    state.counters.feed_requests.fetch_add(1, Relaxed);
    let dividend_yield = match state.feed.dividend_yield(&ticker).await {
        Ok(q) => q,
        Err(e) => {
            state.counters.feed_errors.fetch_add(1, Relaxed);
            return Err(e);
        }
    };

    let base = PricingParameters::new(
        inputs.spot,
        inputs.strike,
        inputs.maturity_years,
        inputs.risk_free_rate,
        inputs.volatility,
        dividend_yield,
        inputs.side.unwrap_or(OptionSide::Call),
    )?;

    Ok((ticker, base, inputs.side))
}

/// GET /api/info/{ticker} -- detailed quote fields from the provider.
pub async fn get_info(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Json<serde_json::Value> {
    let ticker = match validation::validate_ticker(&ticker) {
        Ok(t) => t,
        Err(e) => {
            state.counters.validation_rejects.fetch_add(1, Relaxed);
            return Json(serde_json::json!({ "error": e.to_string() }));
        }
    };

    state.counters.feed_requests.fetch_add(1, Relaxed);
    match state.feed.stock_info(&ticker).await {
        Ok(info) => Json(serde_json::json!(info)),
        Err(e) => {
            state.counters.feed_errors.fetch_add(1, Relaxed);
            tracing::warn!(error = %e, "info request failed");
            Json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

/// GET /api/history/{ticker}?period= -- close-price series.
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> Json<serde_json::Value> {
    match history_request(&state, &ticker, params.period.as_deref()).await {
        Ok((ticker, period, series)) => Json(serde_json::json!({
            "ticker": ticker,
            "period": period,
            "series": series,
        })),
        Err(e) => {
            tracing::warn!(error = %e, "history request failed");
            Json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

/// GET /api/history/{ticker}/svg?period= -- close-price series rendered
/// as a chart.
pub async fn get_history_svg(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> Response {
    let rendered = match history_request(&state, &ticker, params.period.as_deref()).await {
        Ok((ticker, period, series)) => chart::render_history_svg(&ticker, period, &series),
        Err(e) => Err(e),
    };
    match rendered {
        Ok(svg) => {
            state.counters.charts_rendered.fetch_add(1, Relaxed);
            ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "history chart failed");
            Json(serde_json::json!({ "error": e.to_string() })).into_response()
        }
    }
}

async fn history_request(
    state: &AppState,
    ticker: &str,
    period: Option<&str>,
) -> PricerResult<(String, &'static str, Vec<crate::feeds::yahoo::ClosePoint>)> {
    let validated: PricerResult<(String, &'static str)> = (|| {
        let ticker = validation::validate_ticker(ticker)?;
        let period = validation::validate_period(period.unwrap_or("1d"))?;
        Ok((ticker, period))
    })();
    let (ticker, period) = match validated {
        Ok(v) => v,
        Err(e) => {
            state.counters.validation_rejects.fetch_add(1, Relaxed);
            return Err(e);
        }
    };

    state.counters.feed_requests.fetch_add(1, Relaxed);
    match state.feed.history(&ticker, period).await {
        Ok(series) => Ok((ticker, period, series)),
        Err(e) => {
            state.counters.feed_errors.fetch_add(1, Relaxed);
            Err(e)
        }
    }
}

/// GET /api/quotes -- recently persisted quotes (cold path).
pub async fn get_quotes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QuotesQuery>,
) -> Json<serde_json::Value> {
    let limit = params.limit.unwrap_or(50).min(200);
    // Stored tickers are normalized; normalize the filter the same way.
    let ticker = match params.ticker.as_deref().map(validation::validate_ticker) {
        None => None,
        Some(Ok(t)) => Some(t),
        Some(Err(e)) => {
            state.counters.validation_rejects.fetch_add(1, Relaxed);
            return Json(serde_json::json!({ "error": e.to_string() }));
        }
    };
    match db::get_recent_quotes(&state.db, ticker.as_deref(), limit) {
        Ok(quotes) => Json(serde_json::json!({ "quotes": quotes })),
        Err(e) => Json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// GET /api/counters -- performance counters (lock-free reads)
pub async fn get_counters(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "quotes_priced": state.counters.quotes_priced.load(Relaxed),
        "curves_generated": state.counters.curves_generated.load(Relaxed),
        "charts_rendered": state.counters.charts_rendered.load(Relaxed),
        "feed_requests": state.counters.feed_requests.load(Relaxed),
        "feed_errors": state.counters.feed_errors.load(Relaxed),
        "validation_rejects": state.counters.validation_rejects.load(Relaxed),
    }))
}
