mod chart;
mod config;
mod db;
mod errors;
mod feeds;
mod pricing;
mod server;
mod state;
mod validation;

use crate::state::{AppState, DbCommand};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    tracing::info!("optiondesk starting");

    // Load config
    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    // Init database
    let db_pool = match db::init_db(&cfg.data_dir) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("database init error: {e}");
            std::process::exit(1);
        }
    };

    // Bounded command channel into the writer task
    let (db_tx, db_rx) = mpsc::channel::<DbCommand>(1024);

    // Shared state
    let app_state = AppState::new(cfg, db_pool.clone(), db_tx);

    // DB writer task (dedicated, owns all write access)
    let db_pool_writer = db_pool.clone();
    tokio::spawn(async move {
        db::run_db_writer(db_pool_writer, db_rx).await;
    });

    // HTTP server
    let port = app_state.config.server_port;
    let app = axum::Router::new()
        .route("/api/health", axum::routing::get(server::routes::health))
        .route("/api/price", axum::routing::post(server::routes::post_price))
        .route("/api/curve", axum::routing::post(server::routes::post_curve))
        .route(
            "/api/curve/svg",
            axum::routing::post(server::routes::post_curve_svg),
        )
        .route(
            "/api/info/{ticker}",
            axum::routing::get(server::routes::get_info),
        )
        .route(
            "/api/history/{ticker}",
            axum::routing::get(server::routes::get_history),
        )
        .route(
            "/api/history/{ticker}/svg",
            axum::routing::get(server::routes::get_history_svg),
        )
        .route("/api/quotes", axum::routing::get(server::routes::get_quotes))
        .route(
            "/api/counters",
            axum::routing::get(server::routes::get_counters),
        )
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(app_state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}
