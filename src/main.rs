//! Chat Proxy - Main entry point
//!
//! This binary loads configuration from the environment, builds the router
//! with all routes and middleware, and runs the HTTP server.

use anyhow::Result;
use chat_proxy::{router, AppConfig, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before reading any environment variables)
    dotenvy::dotenv().ok();

    init_tracing();

    // Fail fast: without a credential there is nothing this server can do.
    let config = AppConfig::from_env()?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let environment = config.environment.clone();

    let state = Arc::new(AppState::new(config));
    let app = router(state);

    tracing::info!("Starting chat proxy on {} ({})", addr, environment);
    tracing::info!("Chat API: POST /api/chat");
    tracing::info!("Health check: GET /health");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize logging from RUST_LOG with noisy HTTP library logs suppressed.
///
/// If RUST_LOG is set to a bare level like "debug" it would let hyper and
/// reqwest trace output through, so the suppression filters are always
/// appended.
fn init_tracing() {
    let base_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,chat_proxy=debug".to_string());

    let filter_str = format!("{},hyper=warn,h2=warn,reqwest=warn", base_filter);

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter_str))
        .init();
}
