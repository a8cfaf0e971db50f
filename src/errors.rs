/// Domain-specific error types for the pricing desk.
/// The service must keep running on per-request failures; only startup
/// errors (config, database init) terminate the process.
#[derive(Debug, thiserror::Error)]
pub enum PricerError {
    #[error("invalid option side: {0:?} (expected \"call\" or \"put\")")]
    InvalidOptionSide(String),

    #[error("invalid input: {0}")]
    Domain(String),

    #[error("market data error: {0}")]
    MarketData(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("chart error: {0}")]
    Chart(String),

    #[error("config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for PricerError {
    fn from(e: reqwest::Error) -> Self {
        PricerError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for PricerError {
    fn from(e: serde_json::Error) -> Self {
        PricerError::Parse(e.to_string())
    }
}

impl From<rusqlite::Error> for PricerError {
    fn from(e: rusqlite::Error) -> Self {
        PricerError::Database(e.to_string())
    }
}

impl From<std::io::Error> for PricerError {
    fn from(e: std::io::Error) -> Self {
        PricerError::Database(e.to_string())
    }
}

pub type PricerResult<T> = Result<T, PricerError>;
