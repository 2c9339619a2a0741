//! Scrape record operations.
//!
//! The store is append-only: rows are inserted once per scrape attempt and
//! never updated or deleted. Freshness is decided per lookup from the
//! caller's window, not stored with the row.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Milliseconds in one minute, the unit of client-supplied cache windows.
pub const MILLIS_PER_MINUTE: i64 = 60_000;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Convert a window in minutes into whole milliseconds, saturating on overflow.
///
/// Fractional windows round up: `last_updated > now - m * 60000` holds for an
/// integer timestamp exactly when it holds against the ceiling. Negative
/// windows are kept, so nothing counts as fresh under them. NaN maps to 0.
pub fn minutes_to_millis(minutes: f64) -> i64 {
    (minutes * MILLIS_PER_MINUTE as f64).ceil() as i64
}

/// One scrape attempt.
///
/// `price` is either decimal-looking numeric text or `"0"` when no price was
/// found. `success` reports whether the fetch and parse completed, which is
/// independent of whether a price was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRecord {
    pub url: String,
    pub domain: String,
    pub price: String,
    pub success: bool,
    /// Milliseconds since the Unix epoch when the row was written.
    pub last_updated: i64,
}

/// A persisted record with its store-assigned identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: i64,
    #[serde(flatten)]
    pub record: ScrapeRecord,
}

fn record_from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<ScrapeRecord> {
    Ok(ScrapeRecord {
        url: row.get(offset)?,
        domain: row.get(offset + 1)?,
        price: row.get(offset + 2)?,
        success: row.get::<_, i32>(offset + 3)? == 1,
        last_updated: row.get(offset + 4)?,
    })
}

impl CacheDb {
    /// Append a record, returning the identity assigned to it.
    pub async fn append(&self, record: &ScrapeRecord) -> Result<i64, Error> {
        let record = record.clone();
        self.conn
            .call(move |conn| -> Result<i64, Error> {
                conn.execute(
                    "INSERT INTO scraped_data (url, domain, price, success, last_updated)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        &record.url,
                        &record.domain,
                        &record.price,
                        record.success as i32,
                        record.last_updated,
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(Error::from)
    }

    /// Most recent record for `url` written within the last `max_age_ms`.
    ///
    /// Returns None when there is no such row; a miss is not an error.
    pub async fn lookup_fresh(&self, url: &str, max_age_ms: i64) -> Result<Option<ScrapeRecord>, Error> {
        self.lookup_fresh_at(url, max_age_ms, now_millis()).await
    }

    /// [`lookup_fresh`](Self::lookup_fresh) against an explicit clock.
    ///
    /// A row is fresh when `last_updated > now_ms - max_age_ms`. Among fresh
    /// rows the last one inserted wins.
    pub async fn lookup_fresh_at(
        &self, url: &str, max_age_ms: i64, now_ms: i64,
    ) -> Result<Option<ScrapeRecord>, Error> {
        let url = url.to_string();
        let cutoff = now_ms.saturating_sub(max_age_ms);
        self.conn
            .call(move |conn| -> Result<Option<ScrapeRecord>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, domain, price, success, last_updated
                     FROM scraped_data
                     WHERE url = ?1 AND last_updated > ?2
                     ORDER BY id DESC
                     LIMIT 1",
                )?;

                let result = stmt.query_row(params![url, cutoff], |row| record_from_row(row, 0));

                match result {
                    Ok(record) => Ok(Some(record)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Snapshot of every stored row, ordered by identity.
    pub async fn all(&self) -> Result<Vec<StoredRecord>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<StoredRecord>, Error> {
                let mut stmt =
                    conn.prepare("SELECT id, url, domain, price, success, last_updated FROM scraped_data ORDER BY id")?;

                let rows = stmt.query_map([], |row| Ok(StoredRecord { id: row.get(0)?, record: record_from_row(row, 1)? }))?;

                let mut records = Vec::new();
                for row in rows {
                    records.push(row?);
                }
                Ok(records)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of stored rows.
    pub async fn count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM scraped_data", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
