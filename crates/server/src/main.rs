//! pricewatch server entry point.
//!
//! Loads configuration, builds the scrape pipeline and serves the HTTP API.
//! Logs are JSON lines filtered by `RUST_LOG` (default `info`).

use std::net::SocketAddr;

use anyhow::Result;
use pricewatch_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod routes;
mod scrape;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let config = AppConfig::load()?;
    let listen_addr: SocketAddr = config.listen_addr.parse()?;

    let state = handler::AppState::from_config(config).await?;
    let db = state.scraper.db().clone();
    let app = handler::create_app(state);

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "price scraping API listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    db.close().await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
