//! Unmatched-rows export.
//!
//! Renders the rows no catalog entry was selected for as a CSV the user can
//! fix by hand and re-import.

use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::{MatchStatus, MovieMatch},
};

const REPORT_HEADERS: [&str; 5] = ["title", "year", "date", "rating", "rawData"];

/// CSV (CRLF line endings, header row first) of every unmatched record
pub fn unmatched_report(records: &[MovieMatch]) -> AppResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(REPORT_HEADERS).map_err(csv_error)?;

    let unmatched = records
        .iter()
        .filter(|record| record.status == MatchStatus::Unmatched);

    let mut count = 0usize;
    for record in unmatched {
        writer
            .write_record([
                record.detected_title.clone(),
                optional(record.detected_year),
                record.detected_date.clone().unwrap_or_default(),
                optional(record.detected_rating),
                record.source_row.join(", "),
            ])
            .map_err(csv_error)?;
        count += 1;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush unmatched report: {}", e)))?;

    tracing::info!(rows = count, "Built unmatched report");

    String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(format!("Unmatched report is not valid UTF-8: {}", e)))
}

/// `unmatched_movies_YYYY-MM-DD.csv`
pub fn unmatched_report_filename(date: NaiveDate) -> String {
    format!("unmatched_movies_{}.csv", date.format("%Y-%m-%d"))
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn csv_error(e: csv::Error) -> AppError {
    AppError::Internal(format!("Failed to write unmatched report: {}", e))
}
