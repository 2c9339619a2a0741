//! `GET /export`: every stored scrape record as CSV.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use pricewatch_core::{Error, StoredRecord};

use crate::error::ApiError;
use crate::handler::AppState;

const CSV_HEADER: [&str; 6] = ["ID", "URL", "DOMAIN", "PRICE", "SUCCESS", "LAST_UPDATED"];

/// Render records as CSV with a header row. `SUCCESS` is written as `1`/`0`.
pub fn render_csv(rows: &[StoredRecord]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CSV_HEADER)
        .map_err(|e| Error::ExportFailed(e.to_string()))?;

    for row in rows {
        let record = &row.record;
        writer
            .write_record([
                row.id.to_string(),
                record.url.clone(),
                record.domain.clone(),
                record.price.clone(),
                u8::from(record.success).to_string(),
                record.last_updated.to_string(),
            ])
            .map_err(|e| Error::ExportFailed(e.to_string()))?;
    }

    writer.into_inner().map_err(|e| Error::ExportFailed(e.to_string()))
}

pub async fn export_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let rows = state.scraper.db().all().await?;

    if rows.is_empty() {
        return Err(ApiError::NotFound("No data found".into()));
    }

    let csv = render_csv(&rows)?;

    if let Some(path) = &state.config.export_path {
        tokio::fs::write(path, &csv)
            .await
            .map_err(|e| Error::ExportFailed(format!("failed to write {}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), rows = rows.len(), "CSV file created");
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"export.csv\""),
        ],
        csv,
    )
        .into_response())
}
