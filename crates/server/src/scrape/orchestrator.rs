//! Per-URL scrape orchestration.
//!
//! Steps run strictly in order:
//! 1. Derive the domain; an unparseable URL fails the call before anything else.
//! 2. Serve a fresh cached record if one exists (no row written).
//! 3. Fetch and extract. On failure re-check the cache, since a concurrent
//!    scrape of the same URL may have filled it meanwhile.
//! 4. Append a row for the attempt, failed attempts included.
//! 5. Return the new record as not cached.

use std::sync::Arc;

use pricewatch_client::{PRICE_NOT_FOUND, PageFetcher, PriceExtractor, derive_domain};
use pricewatch_core::cache::{minutes_to_millis, now_millis};
use pricewatch_core::{CacheDb, Error, ScrapeRecord};
use serde::Serialize;

/// A scrape record as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResult {
    #[serde(flatten)]
    pub record: ScrapeRecord,
    /// True when served from the cache rather than freshly scraped.
    pub is_cached: bool,
}

impl PriceResult {
    fn cached(record: ScrapeRecord) -> Self {
        Self { record, is_cached: true }
    }

    fn fresh(record: ScrapeRecord) -> Self {
        Self { record, is_cached: false }
    }
}

/// Owns the cache store, fetcher and extractor used by every scrape.
pub struct Scraper {
    db: CacheDb,
    fetcher: Arc<dyn PageFetcher>,
    extractor: PriceExtractor,
}

impl Scraper {
    pub fn new(db: CacheDb, fetcher: Arc<dyn PageFetcher>, extractor: PriceExtractor) -> Self {
        Self { db, fetcher, extractor }
    }

    /// The cache store this scraper reads and appends to.
    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    /// Scrape one URL, honouring a cache window of `cache_expiry_minutes`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` for URLs that are not absolute http(s)
    /// URLs, and `Error::Database` if the cache store fails. Fetch and
    /// extraction failures are recorded, not returned.
    pub async fn scrape(&self, url: &str, cache_expiry_minutes: f64) -> Result<PriceResult, Error> {
        let domain = derive_domain(url)?;
        let max_age_ms = minutes_to_millis(cache_expiry_minutes);

        if let Some(record) = self.db.lookup_fresh(url, max_age_ms).await? {
            tracing::debug!(url, price = %record.price, "cache hit");
            return Ok(PriceResult::cached(record));
        }

        let (price, success) = match self.fetch_price(url, &domain).await {
            Ok(price) => (price, true),
            Err(err) => {
                tracing::warn!(url, error = %err, "scrape failed");

                if let Some(record) = self.db.lookup_fresh(url, max_age_ms).await? {
                    tracing::debug!(url, "serving record cached during failed scrape");
                    return Ok(PriceResult::cached(record));
                }

                (PRICE_NOT_FOUND.to_string(), false)
            }
        };

        let record = ScrapeRecord { url: url.to_string(), domain, price, success, last_updated: now_millis() };
        self.db.append(&record).await?;

        tracing::info!(url, domain = %record.domain, price = %record.price, success, "scraped");

        Ok(PriceResult::fresh(record))
    }

    async fn fetch_price(&self, url: &str, domain: &str) -> Result<String, Error> {
        let html = self.fetcher.fetch_html(url).await?;
        Ok(self.extractor.extract(&html, domain))
    }
}
