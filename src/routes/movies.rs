use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult, models::CatalogMovie, routes::AppState, services::title_search,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    #[serde(default)]
    year: Option<i32>,
}

/// Handler for catalog title search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<CatalogMovie>>> {
    let movies =
        title_search::search_titles(state.matcher.provider().clone(), &params.q, params.year)
            .await?;
    Ok(Json(movies))
}

/// Handler for a single catalog entry
pub async fn details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> AppResult<Json<CatalogMovie>> {
    let movie = title_search::movie_details(state.matcher.provider().clone(), id).await?;
    Ok(Json(movie))
}
