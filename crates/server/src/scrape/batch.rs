//! Batch scraping with tolerate-partial-failure semantics.
//!
//! Every URL of a batch is scraped concurrently (bounded by a semaphore) and
//! the batch waits for all of them. A failing URL only degrades its own slot;
//! metrics are computed afterwards from whichever records carry a usable price.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

use pricewatch_core::Error;

use super::orchestrator::{PriceResult, Scraper};

/// Outcome of one URL in a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    /// The URL was scraped or served from cache.
    Record(PriceResult),
    /// The URL could not be processed (e.g. it is not an absolute URL).
    Failed { url: String, error: String },
}

impl BatchEntry {
    /// Price text of a record entry.
    pub fn price(&self) -> Option<&str> {
        match self {
            BatchEntry::Record(result) => Some(result.record.price.as_str()),
            BatchEntry::Failed { .. } => None,
        }
    }
}

/// Best, worst and average over the positive prices of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceMetrics {
    pub best_price: String,
    pub worst_price: String,
    pub average_price: String,
}

impl PriceMetrics {
    /// Compute metrics, ignoring prices that are unparseable or not positive.
    ///
    /// Returns None when no price qualifies.
    pub fn from_prices<'a>(prices: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let values: Vec<f64> = prices
            .into_iter()
            .filter_map(|price| price.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite() && *value > 0.0)
            .collect();

        if values.is_empty() {
            return None;
        }

        let best = values.iter().copied().fold(f64::INFINITY, f64::min);
        let worst = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let average = values.iter().sum::<f64>() / values.len() as f64;

        Some(Self { best_price: best.to_string(), worst_price: worst.to_string(), average_price: to_fixed_2(average) })
    }
}

/// Render a positive value with two decimals, rounding exact midpoints up.
///
/// `{:.2}` breaks exact ties to even (`1.125` -> `1.12`). A value can only sit
/// exactly on a midpoint of the second decimal when it is a multiple of 1/8
/// but not of 1/4; those are rounded up, everything else is already rounded
/// to nearest from its exact binary value.
fn to_fixed_2(value: f64) -> String {
    let eighths = value * 8.0;
    let is_midpoint = eighths.fract() == 0.0 && (value * 4.0).fract() != 0.0;

    if is_midpoint {
        format!("{:.2}", (value * 100.0).ceil() / 100.0)
    } else {
        format!("{value:.2}")
    }
}

/// Per-URL entries in input order, plus metrics when any price was found.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub entries: Vec<BatchEntry>,
    pub metrics: Option<PriceMetrics>,
}

/// Limits applied to a batch run.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Maximum URLs scraped at the same time (at least 1).
    pub max_concurrency: usize,
    /// Deadline for the whole batch; unfinished URLs are reported as failed.
    pub deadline: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { max_concurrency: 16, deadline: None }
    }
}

/// Scrape `urls` concurrently and aggregate their prices.
///
/// # Errors
///
/// A slot failing on anything other than a malformed URL (the cache store
/// being unavailable, say) is still reported in its entry. It only fails the
/// whole batch when no slot produced a usable price.
pub async fn run_batch(
    scraper: Arc<Scraper>, urls: Vec<String>, cache_expiry_minutes: f64, options: BatchOptions,
) -> Result<BatchResult, Error> {
    let semaphore = Arc::new(Semaphore::new(options.max_concurrency.max(1)));
    let mut join_set = JoinSet::new();

    for (index, url) in urls.iter().cloned().enumerate() {
        let scraper = Arc::clone(&scraper);
        let semaphore = Arc::clone(&semaphore);

        join_set.spawn(async move {
            // NOTE: Hold permit for task duration to enforce concurrency limit
            let _permit = semaphore.acquire_owned().await;
            let result = scraper.scrape(&url, cache_expiry_minutes).await;
            (index, url, result)
        });
    }

    let deadline = options.deadline.map(|limit| Instant::now() + limit);
    let mut slots: Vec<Option<BatchEntry>> = vec![None; urls.len()];
    let mut timed_out = false;
    let mut unexpected: Option<Error> = None;

    loop {
        let next = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, join_set.join_next()).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::warn!(pending = join_set.len(), "batch deadline exceeded, aborting remaining scrapes");
                    join_set.abort_all();
                    timed_out = true;
                    break;
                }
            },
            None => join_set.join_next().await,
        };

        let Some(joined) = next else { break };

        match joined {
            Ok((index, _, Ok(result))) => slots[index] = Some(BatchEntry::Record(result)),
            Ok((index, url, Err(err))) => {
                tracing::warn!(url = %url, error = %err, "scrape slot failed");
                slots[index] = Some(BatchEntry::Failed { url, error: err.to_string() });
                if !matches!(err, Error::InvalidUrl(_)) && unexpected.is_none() {
                    unexpected = Some(err);
                }
            }
            Err(err) => tracing::error!(error = %err, "scrape task did not complete"),
        }
    }

    let reason = if timed_out { "batch deadline exceeded" } else { "scrape task did not complete" };
    let entries: Vec<BatchEntry> = slots
        .into_iter()
        .zip(urls)
        .map(|(slot, url)| slot.unwrap_or_else(|| BatchEntry::Failed { url, error: reason.to_string() }))
        .collect();

    let metrics = PriceMetrics::from_prices(entries.iter().filter_map(BatchEntry::price));

    tracing::info!(
        urls = entries.len(),
        failed = entries.iter().filter(|entry| matches!(entry, BatchEntry::Failed { .. })).count(),
        found = metrics.is_some(),
        "batch complete"
    );

    if metrics.is_none()
        && let Some(err) = unexpected
    {
        return Err(err);
    }

    Ok(BatchResult { entries, metrics })
}
