//! Core types and shared functionality for pricewatch.
//!
//! This crate provides:
//! - Scrape record cache with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, ScrapeRecord, StoredRecord};
pub use config::{AppConfig, ConfigError, PriceOverride};
pub use error::Error;
