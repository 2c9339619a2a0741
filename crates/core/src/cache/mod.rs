//! SQLite-backed cache of scrape attempts.
//!
//! This module provides an append-only record store using SQLite with
//! async access via tokio-rusqlite. It supports:
//!
//! - Per-call freshness windows (TTL chosen by the caller)
//! - Automatic schema migrations
//! - In-memory (process lifetime) or file-backed databases

pub mod connection;
pub mod migrations;
pub mod records;

pub use crate::Error;

pub use connection::CacheDb;
pub use records::{MILLIS_PER_MINUTE, ScrapeRecord, StoredRecord, minutes_to_millis, now_millis};
