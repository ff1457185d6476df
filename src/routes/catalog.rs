use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{error::AppResult, routes::AppState, services::providers::CatalogSettings};

#[derive(Debug, Deserialize)]
pub struct CacheQuery {
    #[serde(default)]
    prefix: Option<String>,
}

/// Sets the catalog access key (and optionally its base URL)
pub async fn configure(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<CatalogSettings>,
) -> AppResult<StatusCode> {
    state.catalog.configure(settings).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Drops cached catalog responses, all of them or those under `prefix`
pub async fn clear_cache(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CacheQuery>,
) -> Json<Value> {
    let cache = state.catalog.cache();
    let removed = match query.prefix.as_deref().filter(|p| !p.is_empty()) {
        Some(prefix) => cache.invalidate_prefix(prefix).await,
        None => cache.clear().await,
    };

    Json(json!({ "removed": removed }))
}
