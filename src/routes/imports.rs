use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{CatalogMovie, CsvColumn, CsvFormat, MatchFilter, MatchSummary, MovieMatch, ParsedTable},
    routes::AppState,
    services::{csv_analysis, export},
};

#[derive(Debug, Default, Deserialize)]
pub struct MatchQuery {
    #[serde(default)]
    pub filter: MatchFilter,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchImportResponse {
    pub import_id: Uuid,
    pub detected_format: CsvFormat,
    pub columns: Vec<CsvColumn>,
    pub matches: Vec<MovieMatch>,
    /// Counts over every row, whatever the filter
    pub summary: MatchSummary,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub record: MovieMatch,
    /// `None` clears the current selection
    #[serde(default)]
    pub candidate: Option<CatalogMovie>,
}

/// Structural analysis only; no catalog lookups
pub async fn analyze(
    Extension(request_id): Extension<RequestId>,
    body: String,
) -> AppResult<Json<ParsedTable>> {
    let table = csv_analysis::parse_csv(&body)?;

    tracing::info!(
        request_id = %request_id,
        rows = table.rows.len(),
        format = ?table.detected_format,
        "Analyzed import"
    );

    Ok(Json(table))
}

/// Parses the upload and matches every row against the catalog
pub async fn match_import(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<MatchQuery>,
    body: String,
) -> AppResult<Json<MatchImportResponse>> {
    let table = csv_analysis::parse_csv(&body)?;
    let import_id = Uuid::new_v4();

    tracing::info!(
        request_id = %request_id,
        import_id = %import_id,
        rows = table.rows.len(),
        "Processing import"
    );

    let matches = state.matcher.match_table(&table).await?;
    let summary = MatchSummary::from_matches(&matches);

    tracing::info!(
        request_id = %request_id,
        import_id = %import_id,
        matched = summary.matched,
        uncertain = summary.uncertain,
        unmatched = summary.unmatched,
        failed = summary.failed,
        "Import matched"
    );

    let matches = matches
        .into_iter()
        .filter(|record| query.filter.accepts(record))
        .collect();

    Ok(Json(MatchImportResponse {
        import_id,
        detected_format: table.detected_format,
        columns: table.columns,
        matches,
        summary,
    }))
}

/// Downloadable CSV of the unmatched records
pub async fn unmatched(Json(records): Json<Vec<MovieMatch>>) -> AppResult<impl IntoResponse> {
    let report = export::unmatched_report(&records)?;
    let filename = export::unmatched_report_filename(chrono::Local::now().date_naive());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        report,
    ))
}

/// Applies a reviewer's choice to a match record
pub async fn select(Json(request): Json<SelectRequest>) -> Json<MovieMatch> {
    let updated = match request.candidate {
        Some(candidate) => request.record.with_selection(candidate),
        None => request.record.cleared(),
    };

    Json(updated)
}
