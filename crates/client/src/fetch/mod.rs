//! HTTP fetch pipeline for product pages.
//!
//! ### Request limits
//! - Explicit per-request timeout (default: 20s)
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)
//!
//! ### Outcomes
//! - Non-2xx statuses, network failures, timeouts and oversized bodies are
//!   all errors; the orchestrator decides how to recover from them.

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, header};
use std::time::{Duration, Instant};

pub use url::{UrlError, domain_of, parse_absolute};

use pricewatch_core::{AppConfig, Error};

/// Derive the record domain for a URL, mapping failures into [`Error::InvalidUrl`].
pub fn derive_domain(url: &str) -> Result<String, Error> {
    domain_of(url).map_err(|e| Error::InvalidUrl(e.to_string()))
}

/// Source of raw product page HTML.
///
/// The orchestrator only depends on this trait, so tests and alternative
/// transports can stand in for [`FetchClient`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the HTML body of `url`.
    async fn fetch_html(&self, url: &str) -> Result<String, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "pricewatch/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "pricewatch/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
        }
    }
}

/// HTTP fetch client with request limits.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Fetch a URL, returning the raw body.
    ///
    /// Respects redirect/byte limits and fails on any non-2xx status.
    pub async fn fetch(&self, url_str: &str) -> Result<Bytes, Error> {
        let start = Instant::now();
        let url = parse_absolute(url_str).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::HttpError(format!("status {}", status.as_u16())));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().to_string();
        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        tracing::debug!(%url, %final_url, fetch_ms = start.elapsed().as_millis() as u64, bytes = bytes.len(), "fetched page");

        Ok(bytes)
    }

    fn classify(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::FetchTimeout(format!("no response within {}ms", self.config.timeout.as_millis()))
        } else {
            Error::HttpError(format!("network error: {}", err))
        }
    }
}

/// Decode a page body as text, replacing invalid UTF-8 sequences.
fn decode_body(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[async_trait]
impl PageFetcher for FetchClient {
    async fn fetch_html(&self, url: &str) -> Result<String, Error> {
        let bytes = self.fetch(url).await?;
        Ok(decode_body(&bytes))
    }
}
