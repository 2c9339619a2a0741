//! `/scrape` handlers.
//!
//! `GET /scrape?url=a,b&cacheExpiryMinutes=n` and
//! `POST /scrape {"urls": [...], "cacheExpiryMinutes": n}` both run one
//! batch and answer with per-URL records plus price metrics.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::handler::AppState;
use crate::scrape::{BatchEntry, PriceMetrics, run_batch};

/// Query string of `GET /scrape`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeQuery {
    /// Comma-separated URL list.
    pub url: Option<String>,
    /// Cache window in minutes; fractions are allowed.
    pub cache_expiry_minutes: Option<f64>,
}

/// JSON body of `POST /scrape`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeBody {
    pub urls: Option<Vec<String>>,
    pub cache_expiry_minutes: Option<f64>,
}

/// Successful `/scrape` response.
#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub prices: Vec<BatchEntry>,
    pub metrics: PriceMetrics,
}

/// Split the `url` query parameter into individual URLs.
fn split_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn scrape_get(
    State(state): State<AppState>, query: Result<Query<ScrapeQuery>, QueryRejection>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let urls = query.url.as_deref().map(split_urls).unwrap_or_default();
    if urls.is_empty() {
        return Err(ApiError::BadRequest("Missing URL parameter".into()));
    }

    scrape_batch(&state, urls, query.cache_expiry_minutes).await
}

pub async fn scrape_post(
    State(state): State<AppState>, body: Result<Json<ScrapeBody>, JsonRejection>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let Some(urls) = body.urls else {
        return Err(ApiError::BadRequest("Missing urls in request body".into()));
    };

    scrape_batch(&state, urls, body.cache_expiry_minutes).await
}

async fn scrape_batch(
    state: &AppState, urls: Vec<String>, cache_expiry_minutes: Option<f64>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let cache_expiry_minutes = match cache_expiry_minutes {
        Some(minutes) if !minutes.is_finite() => {
            return Err(ApiError::BadRequest("cacheExpiryMinutes must be a finite number".into()));
        }
        Some(minutes) => minutes,
        None => state.config.default_cache_expiry_minutes as f64,
    };
    tracing::debug!(urls = urls.len(), cache_expiry_minutes, "scrape request");

    let result = run_batch(state.scraper.clone(), urls, cache_expiry_minutes, state.batch_options()).await?;

    match result.metrics {
        Some(metrics) => Ok(Json(ScrapeResponse { prices: result.entries, metrics })),
        None => Err(ApiError::NotFound("Price(s) not found".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use pricewatch_core::AppConfig;

    use crate::routes::test_support::{app, send_json, state_with};
    use crate::scrape::testing::{StubFetcher, page_with_price};

    fn stub() -> Arc<StubFetcher> {
        Arc::new(
            StubFetcher::new()
                .with_page("https://a.example/p", &page_with_price("10"))
                .with_page("https://www.b.example/p", &page_with_price("20")),
        )
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().method(Method::GET).uri(uri).body(Body::empty()).unwrap()
    }

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/scrape")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_split_urls() {
        assert_eq!(split_urls("https://a.example/p, https://b.example/p,,"), vec![
            "https://a.example/p".to_string(),
            "https://b.example/p".to_string()
        ]);
        assert!(split_urls(" , ").is_empty());
    }

    #[tokio::test]
    async fn test_get_scrape_success() {
        let state = state_with(stub(), AppConfig::default()).await;
        let (status, json) =
            send_json(app(state), get("/scrape?url=https://a.example/p,https://www.b.example/p&cacheExpiryMinutes=5"))
                .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["prices"][0]["price"], "10");
        assert_eq!(json["prices"][1]["domain"], "b.example");
        assert_eq!(json["prices"][1]["isCached"], false);
        assert!(json["prices"][0]["lastUpdated"].is_i64());
        assert_eq!(json["metrics"]["bestPrice"], "10");
        assert_eq!(json["metrics"]["worstPrice"], "20");
        assert_eq!(json["metrics"]["averagePrice"], "15.00");
    }

    #[tokio::test]
    async fn test_get_scrape_missing_url() {
        let state = state_with(stub(), AppConfig::default()).await;
        let (status, json) = send_json(app(state), get("/scrape")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Missing URL parameter");
    }

    #[tokio::test]
    async fn test_get_scrape_bad_expiry() {
        let state = state_with(stub(), AppConfig::default()).await;
        let (status, json) = send_json(app(state), get("/scrape?url=https://a.example/p&cacheExpiryMinutes=soon")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_get_scrape_not_found() {
        let state = state_with(stub(), AppConfig::default()).await;
        let (status, json) = send_json(app(state), get("/scrape?url=https://missing.example/p")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Price(s) not found");
    }

    #[tokio::test]
    async fn test_get_scrape_serves_cache_second_time() {
        let fetcher = stub();
        let state = state_with(fetcher.clone(), AppConfig::default()).await;

        send_json(app(state.clone()), get("/scrape?url=https://a.example/p")).await;
        let (status, json) = send_json(app(state), get("/scrape?url=https://a.example/p")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["prices"][0]["isCached"], true);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_post_scrape_success_with_failed_slot() {
        let state = state_with(stub(), AppConfig::default()).await;
        let (status, json) = send_json(
            app(state),
            post(r#"{"urls": ["https://a.example/p", "nonsense", "https://missing.example/p"], "cacheExpiryMinutes": 1}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["prices"].as_array().unwrap().len(), 3);
        assert_eq!(json["prices"][1]["url"], "nonsense");
        assert!(json["prices"][1]["error"].as_str().unwrap().starts_with("INVALID_URL"));
        assert_eq!(json["prices"][2]["success"], false);
        assert_eq!(json["prices"][2]["price"], "0");
        assert_eq!(json["metrics"]["averagePrice"], "10.00");
    }

    #[tokio::test]
    async fn test_post_scrape_missing_urls() {
        let state = state_with(stub(), AppConfig::default()).await;
        let (status, json) = send_json(app(state), post(r#"{"cacheExpiryMinutes": 5}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Missing urls in request body");
    }

    #[tokio::test]
    async fn test_post_scrape_malformed_body() {
        let state = state_with(stub(), AppConfig::default()).await;
        let (status, _) = send_json(app(state), post("{not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_scrape_fractional_window() {
        let fetcher = stub();
        let state = state_with(fetcher.clone(), AppConfig::default()).await;
        let body = r#"{"urls": ["https://a.example/p"], "cacheExpiryMinutes": 0.5}"#;

        let (status, _) = send_json(app(state.clone()), post(body)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = send_json(app(state), post(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["prices"][0]["isCached"], true);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_post_scrape_negative_window_refetches() {
        let fetcher = stub();
        let state = state_with(fetcher.clone(), AppConfig::default()).await;
        let body = r#"{"urls": ["https://a.example/p"], "cacheExpiryMinutes": -2}"#;

        send_json(app(state.clone()), post(body)).await;
        let (status, json) = send_json(app(state), post(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["prices"][0]["isCached"], false);
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_get_scrape_non_finite_expiry() {
        let state = state_with(stub(), AppConfig::default()).await;
        let (status, json) = send_json(app(state), get("/scrape?url=https://a.example/p&cacheExpiryMinutes=NaN")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "cacheExpiryMinutes must be a finite number");
    }

    #[tokio::test]
    async fn test_scrape_with_unavailable_store_is_internal_error() {
        let fetcher = stub();
        let state = state_with(fetcher.clone(), AppConfig::default()).await;
        state.scraper.db().clone().close().await.unwrap();

        let (status, json) = send_json(app(state), get("/scrape?url=https://a.example/p")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().starts_with("CACHE_ERROR"));
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_post_scrape_empty_list_not_found() {
        let state = state_with(stub(), AppConfig::default()).await;
        let (status, json) = send_json(app(state), post(r#"{"urls": []}"#)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Price(s) not found");
    }
}
