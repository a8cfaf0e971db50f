use crate::errors::{PricerError, PricerResult};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub market_data_base_url: String,
    pub data_dir: PathBuf,
    pub server_port: u16,
    pub curve_low_price: u32,
    pub curve_high_price: u32,
}

impl AppConfig {
    pub fn from_env() -> PricerResult<Self> {
        dotenvy::dotenv().ok();

        let server_port = env_var_or("SERVER_PORT", "3002")
            .parse::<u16>()
            .map_err(|e| PricerError::Config(format!("SERVER_PORT: {e}")))?;

        let curve_low_price = env_var_or("CURVE_LOW_PRICE", "50")
            .parse::<u32>()
            .map_err(|e| PricerError::Config(format!("CURVE_LOW_PRICE: {e}")))?;

        let curve_high_price = env_var_or("CURVE_HIGH_PRICE", "150")
            .parse::<u32>()
            .map_err(|e| PricerError::Config(format!("CURVE_HIGH_PRICE: {e}")))?;

        if curve_low_price == 0 || curve_low_price > curve_high_price {
            return Err(PricerError::Config(format!(
                "curve price range [{curve_low_price}, {curve_high_price}] is invalid"
            )));
        }

        Ok(Self {
            market_data_base_url: env_var_or(
                "MARKET_DATA_BASE_URL",
                "https://query1.finance.yahoo.com",
            ),
            data_dir: PathBuf::from(env_var_or("DATA_DIR", "data")),
            server_port,
            curve_low_price,
            curve_high_price,
        })
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
