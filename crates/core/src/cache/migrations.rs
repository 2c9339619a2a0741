//! Cache schema setup.
//!
//! The applied schema version is kept in SQLite's `user_version` pragma.
//! Each script runs in its own transaction together with the version bump.

use super::Error;
use tokio_rusqlite::Connection;

/// Schema scripts; script `n` (0-based) brings the store to version `n + 1`.
const SCHEMA: &[&str] = &[include_str!("../../migrations/001_scraped_data.sql")];

/// Bring the store up to the latest schema version.
///
/// # Errors
///
/// Returns an error if the stored version is unknown or a script fails.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        let applied: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        let applied = usize::try_from(applied)
            .ok()
            .filter(|version| *version <= SCHEMA.len())
            .ok_or_else(|| Error::MigrationFailed(format!("unknown schema version {applied}")))?;

        for (index, sql) in SCHEMA.iter().enumerate().skip(applied) {
            let version = index + 1;
            let tx = conn.transaction()?;
            tx.execute_batch(sql)?;
            tx.pragma_update(None, "user_version", version as i64)?;
            tx.commit()?;
            tracing::debug!(version, "applied cache schema");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}
