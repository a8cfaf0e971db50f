use crate::config::AppConfig;
use crate::db::DbPool;
use crate::feeds::yahoo::YahooClient;
use crate::pricing::BlackScholes;
use portable_atomic::AtomicU64;
use std::sync::Arc;
use tokio::sync::mpsc;

// ── DB Commands (sent to writer task via bounded channel) ──

#[derive(Debug)]
pub enum DbCommand {
    InsertQuote {
        id: String,
        created_at: String,
        ticker: String,
        spot: f64,
        strike: f64,
        maturity_years: f64,
        risk_free_rate: f64,
        volatility: f64,
        dividend_yield: f64,
        call_price: f64,
        put_price: f64,
    },
}

// ── Performance Counters (lock-free) ──

pub struct PerfCounters {
    pub quotes_priced: AtomicU64,
    pub curves_generated: AtomicU64,
    pub charts_rendered: AtomicU64,
    pub feed_requests: AtomicU64,
    pub feed_errors: AtomicU64,
    pub validation_rejects: AtomicU64,
}

impl PerfCounters {
    pub fn new() -> Self {
        Self {
            quotes_priced: AtomicU64::new(0),
            curves_generated: AtomicU64::new(0),
            charts_rendered: AtomicU64::new(0),
            feed_requests: AtomicU64::new(0),
            feed_errors: AtomicU64::new(0),
            validation_rejects: AtomicU64::new(0),
        }
    }
}

// ── Application shared state (channels, not locks) ──

pub struct AppState {
    pub config: AppConfig,
    pub db: DbPool,

    // Handlers -> DB Writer: bounded command channel
    pub db_tx: mpsc::Sender<DbCommand>,

    // Upstream quote provider
    pub feed: YahooClient,

    // Pricing engine (pure, Send + Sync, shared freely)
    pub engine: BlackScholes,

    // Lock-free performance counters
    pub counters: PerfCounters,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool, db_tx: mpsc::Sender<DbCommand>) -> Arc<Self> {
        let feed = YahooClient::new(&config.market_data_base_url);
        Arc::new(Self {
            config,
            db,
            db_tx,
            feed,
            engine: BlackScholes::new(),
            counters: PerfCounters::new(),
        })
    }
}
