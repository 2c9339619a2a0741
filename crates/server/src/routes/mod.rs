//! HTTP route handlers.
//!
//! Thin wrappers that validate input, call the scrape pipeline or the cache
//! store, and shape responses.

pub mod export;
pub mod scrape;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use pricewatch_client::PriceExtractor;
    use pricewatch_core::{AppConfig, CacheDb};
    use tower::util::ServiceExt;

    use crate::handler::{AppState, create_app};
    use crate::scrape::{Scraper, testing::StubFetcher};

    pub(crate) async fn state_with(fetcher: Arc<StubFetcher>, config: AppConfig) -> AppState {
        let db = CacheDb::open_in_memory().await.unwrap();
        AppState::new(Scraper::new(db, fetcher, PriceExtractor::new()), config)
    }

    pub(crate) async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    pub(crate) async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    pub(crate) fn app(state: AppState) -> Router {
        create_app(state)
    }
}
