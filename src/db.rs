use crate::errors::{PricerError, PricerResult};
use crate::state::DbCommand;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub type DbPool = Arc<Mutex<Connection>>;

pub fn init_db(data_dir: &Path) -> PricerResult<DbPool> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| PricerError::Database(format!("create dir: {e}")))?;
    let db_path = data_dir.join("optiondesk.db");
    let conn = Connection::open(&db_path)?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

    let schema = include_str!("../migrations/001_init.sql");
    conn.execute_batch(schema)?;

    tracing::info!("database initialized at {}", db_path.display());
    Ok(Arc::new(Mutex::new(conn)))
}

/// Dedicated DB writer task. Reads commands from the bounded channel and
/// executes SQL. This is the only task that writes to the database.
pub async fn run_db_writer(db: DbPool, mut rx: mpsc::Receiver<DbCommand>) {
    tracing::info!("db writer task started");

    while let Some(cmd) = rx.recv().await {
        if let Err(e) = execute_command(&db, cmd) {
            tracing::error!("db write error: {e}");
        }
    }

    tracing::info!("db writer task shutting down");
}

fn execute_command(db: &DbPool, cmd: DbCommand) -> PricerResult<()> {
    let conn = db
        .lock()
        .map_err(|e| PricerError::Database(format!("lock poisoned: {e}")))?;

    match cmd {
        DbCommand::InsertQuote {
            id,
            created_at,
            ticker,
            spot,
            strike,
            maturity_years,
            risk_free_rate,
            volatility,
            dividend_yield,
            call_price,
            put_price,
        } => {
            conn.execute(
                "INSERT INTO quotes (id, created_at, ticker, spot, strike, maturity_years, risk_free_rate, volatility, dividend_yield, call_price, put_price)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                rusqlite::params![
                    id,
                    created_at,
                    ticker,
                    spot,
                    strike,
                    maturity_years,
                    risk_free_rate,
                    volatility,
                    dividend_yield,
                    call_price,
                    put_price
                ],
            )?;
        }
    }
    Ok(())
}

// ── Query helpers (for server reads -- these DO lock, but only from cold path) ──

pub fn get_recent_quotes(
    db: &DbPool,
    ticker: Option<&str>,
    limit: usize,
) -> PricerResult<Vec<QuoteRow>> {
    let conn = db
        .lock()
        .map_err(|e| PricerError::Database(format!("lock: {e}")))?;
    let (sql, params): (String, Vec<Box<dyn rusqlite::types::ToSql>>) = match ticker {
        Some(t) => (
            "SELECT id, created_at, ticker, spot, strike, maturity_years, risk_free_rate, volatility, dividend_yield, call_price, put_price FROM quotes WHERE ticker = ?1 ORDER BY created_at DESC LIMIT ?2".into(),
            vec![Box::new(t.to_string()), Box::new(limit as i64)],
        ),
        None => (
            "SELECT id, created_at, ticker, spot, strike, maturity_years, risk_free_rate, volatility, dividend_yield, call_price, put_price FROM quotes ORDER BY created_at DESC LIMIT ?1".into(),
            vec![Box::new(limit as i64)],
        ),
    };
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), |row| {
        Ok(QuoteRow {
            id: row.get(0)?,
            created_at: row.get(1)?,
            ticker: row.get(2)?,
            spot: row.get(3)?,
            strike: row.get(4)?,
            maturity_years: row.get(5)?,
            risk_free_rate: row.get(6)?,
            volatility: row.get(7)?,
            dividend_yield: row.get(8)?,
            call_price: row.get(9)?,
            put_price: row.get(10)?,
        })
    })?;
    Ok(rows.filter_map(|r| r.ok()).collect())
}

// ── Row types ──

#[derive(Debug, Clone, serde::Serialize)]
pub struct QuoteRow {
    pub id: String,
    pub created_at: String,
    pub ticker: String,
    pub spot: f64,
    pub strike: f64,
    pub maturity_years: f64,
    pub risk_free_rate: f64,
    pub volatility: f64,
    pub dividend_yield: f64,
    pub call_price: f64,
    pub put_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_memory_pool() -> DbPool {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(include_str!("../migrations/001_init.sql"))
            .unwrap();
        Arc::new(Mutex::new(conn))
    }

    fn sample_quote(id: &str, ticker: &str, created_at: &str) -> DbCommand {
        DbCommand::InsertQuote {
            id: id.to_string(),
            created_at: created_at.to_string(),
            ticker: ticker.to_string(),
            spot: 100.0,
            strike: 100.0,
            maturity_years: 1.0,
            risk_free_rate: 0.05,
            volatility: 0.2,
            dividend_yield: 0.0,
            call_price: 10.451,
            put_price: 5.574,
        }
    }

    #[test]
    fn test_insert_and_read_back() {
        let pool = in_memory_pool();
        execute_command(&pool, sample_quote("q1", "AAPL", "2026-01-02T10:00:00Z")).unwrap();

        let rows = get_recent_quotes(&pool, Some("AAPL"), 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "q1");
        assert_eq!(rows[0].call_price, 10.451);
        assert_eq!(rows[0].put_price, 5.574);
    }

    #[test]
    fn test_ticker_filter_and_ordering() {
        let pool = in_memory_pool();
        execute_command(&pool, sample_quote("q1", "AAPL", "2026-01-02T10:00:00Z")).unwrap();
        execute_command(&pool, sample_quote("q2", "MSFT", "2026-01-02T11:00:00Z")).unwrap();
        execute_command(&pool, sample_quote("q3", "AAPL", "2026-01-02T12:00:00Z")).unwrap();

        let all = get_recent_quotes(&pool, None, 10).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, "q3", "newest first");

        let aapl = get_recent_quotes(&pool, Some("AAPL"), 10).unwrap();
        assert_eq!(aapl.len(), 2);
        assert!(aapl.iter().all(|r| r.ticker == "AAPL"));
    }

    #[test]
    fn test_duplicate_id_is_a_database_error() {
        let pool = in_memory_pool();
        execute_command(&pool, sample_quote("q1", "AAPL", "2026-01-02T10:00:00Z")).unwrap();
        let err =
            execute_command(&pool, sample_quote("q1", "AAPL", "2026-01-02T10:05:00Z")).unwrap_err();
        assert!(matches!(err, PricerError::Database(_)), "got {err}");
    }
}
