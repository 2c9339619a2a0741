//! HTTP application wiring.
//!
//! Builds the shared state (cache store, fetcher, extractor) from the
//! configuration and routes requests to the handlers in [`crate::routes`].

use std::sync::Arc;

use axum::{Router, routing::get};
use pricewatch_client::{FetchClient, FetchConfig, PriceExtractor};
use pricewatch_core::{AppConfig, CacheDb, Error};
use tower_http::trace::TraceLayer;

use crate::routes::{export, scrape};
use crate::scrape::{BatchOptions, Scraper};

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub scraper: Arc<Scraper>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(scraper: Scraper, config: AppConfig) -> Self {
        Self { scraper: Arc::new(scraper), config: Arc::new(config) }
    }

    /// Open the cache and build the fetch/extract pipeline from `config`.
    ///
    /// # Errors
    ///
    /// Fails if the cache cannot be opened, the HTTP client cannot be built,
    /// or an override selector is invalid.
    pub async fn from_config(config: AppConfig) -> Result<Self, Error> {
        let db = CacheDb::open_configured(config.db_path.as_deref()).await?;
        let fetcher = FetchClient::new(FetchConfig::from(&config))?;
        let extractor = PriceExtractor::from_overrides(&config.overrides)?;

        tracing::info!(overrides = extractor.rule_count(), timeout_ms = config.timeout_ms, "scrape pipeline ready");

        Ok(Self::new(Scraper::new(db, Arc::new(fetcher), extractor), config))
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions { max_concurrency: self.config.max_concurrency, deadline: self.config.batch_timeout() }
    }
}

/// Build the router with all routes registered.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/scrape", get(scrape::scrape_get).post(scrape::scrape_post))
        .route("/export", get(export::export_csv))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
