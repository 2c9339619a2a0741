//! Test doubles for the scrape pipeline.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pricewatch_client::{PageFetcher, PriceExtractor};
use pricewatch_core::{CacheDb, Error};

use super::Scraper;

/// Serves canned pages and counts every fetch.
///
/// URLs without a page answer with an HTTP 404 error.
#[derive(Default)]
pub(crate) struct StubFetcher {
    pages: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub(crate) fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| Error::HttpError("status 404".into()))
    }
}

/// Scraper over a fresh in-memory cache and the generic extractor.
pub(crate) async fn scraper_with(fetcher: Arc<StubFetcher>) -> Scraper {
    let db = CacheDb::open_in_memory().await.unwrap();
    Scraper::new(db, fetcher, PriceExtractor::new())
}

/// Product page whose first price candidate shows `price`.
pub(crate) fn page_with_price(price: &str) -> String {
    format!(r#"<html><body><h1>Item</h1><div class="product-price">${price}</div></body></html>"#)
}
