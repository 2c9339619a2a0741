//! Scrape-and-cache pipeline.
//!
//! [`orchestrator`] decides, for one URL, between serving the cache and
//! fetching; [`batch`] fans a URL list out over the orchestrator and
//! aggregates price metrics.

pub mod batch;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{BatchEntry, BatchOptions, PriceMetrics, run_batch};
pub use orchestrator::Scraper;
