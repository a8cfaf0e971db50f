use crate::errors::{PricerError, PricerResult};
use reqwest::Client;

/// Yahoo-style quote API client. All methods return Result, never panic.
/// Provider failures are fatal to the single request that triggered them,
/// never to the process.
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
}

/// Detailed quote fields for a ticker. The provider omits fields freely,
/// so everything stays optional.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StockInfo {
    pub ticker: String,
    pub open: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
}

/// One observation of the close-price series.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ClosePoint {
    /// Unix seconds
    pub timestamp: i64,
    pub close: f64,
}

// Provider response shapes. quoteSummary wraps every numeric field as
// {"raw": 0.0042, "fmt": "0.42%"}; the chart endpoint parallel-indexes
// timestamps and close arrays.

#[derive(serde::Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: Option<QuoteSummaryBody>,
}

#[derive(serde::Deserialize)]
struct QuoteSummaryBody {
    result: Option<Vec<QuoteSummaryResult>>,
    #[allow(dead_code)]
    error: Option<serde_json::Value>,
}

#[derive(serde::Deserialize)]
struct QuoteSummaryResult {
    #[serde(rename = "summaryDetail")]
    summary_detail: Option<SummaryDetail>,
}

#[derive(serde::Deserialize)]
struct SummaryDetail {
    open: Option<RawValue>,
    #[serde(rename = "dayHigh")]
    day_high: Option<RawValue>,
    #[serde(rename = "dayLow")]
    day_low: Option<RawValue>,
    #[serde(rename = "marketCap")]
    market_cap: Option<RawValue>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    #[serde(rename = "dividendYield")]
    dividend_yield: Option<RawValue>,
    #[serde(rename = "fiftyTwoWeekHigh")]
    fifty_two_week_high: Option<RawValue>,
    #[serde(rename = "fiftyTwoWeekLow")]
    fifty_two_week_low: Option<RawValue>,
}

#[derive(serde::Deserialize)]
struct RawValue {
    raw: Option<f64>,
    #[allow(dead_code)]
    fmt: Option<String>,
}

#[derive(serde::Deserialize)]
struct ChartEnvelope {
    chart: Option<ChartBody>,
}

#[derive(serde::Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    #[allow(dead_code)]
    error: Option<serde_json::Value>,
}

#[derive(serde::Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(serde::Deserialize)]
struct Indicators {
    quote: Option<Vec<QuoteBlock>>,
}

#[derive(serde::Deserialize)]
struct QuoteBlock {
    close: Option<Vec<Option<f64>>>,
}

impl YahooClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .pool_max_idle_per_host(4)
                .user_agent("Mozilla/5.0 (compatible; optiondesk/0.1)")
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> PricerResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PricerError::MarketData(format!("HTTP {status}: {body}")));
        }

        resp.json::<T>()
            .await
            .map_err(|e| PricerError::Parse(format!("GET {path}: {e}")))
    }

    /// Detailed quote fields for a ticker. A missing result set is a hard
    /// error; missing individual fields are not.
    pub async fn stock_info(&self, ticker: &str) -> PricerResult<StockInfo> {
        let path = format!("/v10/finance/quoteSummary/{ticker}?modules=summaryDetail");
        let envelope: QuoteSummaryEnvelope = self.get_json(&path).await?;
        extract_stock_info(ticker, envelope)
    }

    /// Continuous dividend yield as a decimal fraction. A missing field
    /// means the underlying pays no dividend: 0.0.
    pub async fn dividend_yield(&self, ticker: &str) -> PricerResult<f64> {
        Ok(self.stock_info(ticker).await?.dividend_yield.unwrap_or(0.0))
    }

    /// Historical close series. Hourly bars for the 1d period, daily bars
    /// otherwise.
    pub async fn history(&self, ticker: &str, period: &str) -> PricerResult<Vec<ClosePoint>> {
        let interval = if period == "1d" { "1h" } else { "1d" };
        let path = format!("/v8/finance/chart/{ticker}?range={period}&interval={interval}");
        let envelope: ChartEnvelope = self.get_json(&path).await?;
        extract_history(ticker, period, envelope)
    }
}

fn extract_stock_info(ticker: &str, envelope: QuoteSummaryEnvelope) -> PricerResult<StockInfo> {
    let detail = envelope
        .quote_summary
        .and_then(|body| body.result)
        .and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.remove(0))
            }
        })
        .and_then(|result| result.summary_detail)
        .ok_or_else(|| PricerError::MarketData(format!("no summary data for {ticker}")))?;

    Ok(StockInfo {
        ticker: ticker.to_string(),
        open: field(detail.open),
        day_high: field(detail.day_high),
        day_low: field(detail.day_low),
        market_cap: field(detail.market_cap),
        trailing_pe: field(detail.trailing_pe),
        dividend_yield: field(detail.dividend_yield),
        fifty_two_week_high: field(detail.fifty_two_week_high),
        fifty_two_week_low: field(detail.fifty_two_week_low),
    })
}

fn extract_history(
    ticker: &str,
    period: &str,
    envelope: ChartEnvelope,
) -> PricerResult<Vec<ClosePoint>> {
    let result = envelope
        .chart
        .and_then(|body| body.result)
        .and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.remove(0))
            }
        })
        .ok_or_else(|| PricerError::MarketData(format!("no history for {ticker}")))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .and_then(|i| i.quote)
        .and_then(|mut quotes| {
            if quotes.is_empty() {
                None
            } else {
                Some(quotes.remove(0))
            }
        })
        .and_then(|q| q.close)
        .unwrap_or_default();

    // Provider marks halted bars as null; drop them.
    let series: Vec<ClosePoint> = timestamps
        .into_iter()
        .zip(closes)
        .filter_map(|(timestamp, close)| close.map(|close| ClosePoint { timestamp, close }))
        .collect();

    if series.is_empty() {
        return Err(PricerError::MarketData(format!(
            "empty close series for {ticker} ({period})"
        )));
    }
    Ok(series)
}

/// Quote fields are stored at the provider's 6-decimal display precision.
#[inline]
fn field(value: Option<RawValue>) -> Option<f64> {
    value.and_then(|v| v.raw).map(round6)
}

#[inline]
fn round6(x: f64) -> f64 {
    (x * 1e6).round() / 1e6
}
