use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{
    cache::ResponseCache,
    config::Config,
    error::AppResult,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{providers::TmdbProvider, MatchingService},
};

pub mod catalog;
pub mod imports;
pub mod movies;

/// Shared application state
pub struct AppState {
    /// Concrete catalog handle, for runtime configuration and cache control
    pub catalog: TmdbProvider,
    /// Batch matcher over the same catalog
    pub matcher: MatchingService,
}

impl AppState {
    /// State around an existing catalog with default batching
    pub fn new(catalog: TmdbProvider) -> Self {
        let matcher = MatchingService::new(Arc::new(catalog.clone()));
        Self { catalog, matcher }
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        let catalog = TmdbProvider::from_config(config, ResponseCache::new())?;
        let matcher = MatchingService::from_config(Arc::new(catalog.clone()), config);
        Ok(Self { catalog, matcher })
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/imports/analyze", post(imports::analyze))
        .route("/imports/match", post(imports::match_import))
        .route("/imports/unmatched", post(imports::unmatched))
        .route("/imports/select", post(imports::select))
        .route("/movies/search", get(movies::search))
        .route("/movies/:id", get(movies::details))
        .route("/catalog/config", put(catalog::configure))
        .route("/catalog/cache", delete(catalog::clear_cache))
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "catalogConfigured": state.catalog.is_configured(),
        })),
    )
}
