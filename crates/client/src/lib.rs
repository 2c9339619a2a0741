//! Client code for pricewatch.
//!
//! This crate provides the HTTP fetch pipeline, domain derivation and price
//! extraction used by the server's scrape orchestrator.

pub mod extract;
pub mod fetch;

pub use extract::{PRICE_NOT_FOUND, PriceExtractor, PriceNode, PriceRule, SelectorRule, scan_candidates};

pub use fetch::{FetchClient, FetchConfig, PageFetcher, derive_domain};
