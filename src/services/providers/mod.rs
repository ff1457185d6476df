/// Movie catalog provider abstraction
///
/// The matching engine only needs two things from a catalog: a title search
/// and a details lookup by id. Keeping them behind a trait lets the batch
/// orchestrator run against a scripted provider in tests.
use crate::{error::AppResult, models::CatalogMovie};

pub mod tmdb;

pub use tmdb::{CatalogSettings, RetryPolicy, TmdbProvider};

/// Trait for movie catalog providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Search for movies by title, optionally narrowed to a release year
    ///
    /// Results keep the catalog's own ranking.
    async fn search_movies(&self, query: &str, year: Option<i32>) -> AppResult<Vec<CatalogMovie>>;

    /// Fetch a single movie by catalog id
    async fn movie_details(&self, id: u64) -> AppResult<CatalogMovie>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
