use crate::{error::AppResult, models::CatalogMovie, services::providers::CatalogProvider};
use std::sync::Arc;

/// Service function for catalog title search
///
/// Delegates to the configured CatalogProvider, keeping HTTP routing free of
/// catalog details. Results keep the catalog's own ranking.
pub async fn search_titles(
    provider: Arc<dyn CatalogProvider>,
    query: &str,
    year: Option<i32>,
) -> AppResult<Vec<CatalogMovie>> {
    provider.search_movies(query, year).await
}

/// Service function for a single catalog entry
pub async fn movie_details(provider: Arc<dyn CatalogProvider>, id: u64) -> AppResult<CatalogMovie> {
    provider.movie_details(id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::providers::MockCatalogProvider;

    fn movie(id: u64, title: &str) -> CatalogMovie {
        CatalogMovie {
            id,
            title: title.to_string(),
            original_title: title.to_string(),
            release_date: None,
            poster_path: None,
            backdrop_path: None,
            overview: None,
            popularity: 0.0,
            vote_average: 0.0,
            vote_count: 0,
        }
    }

    #[tokio::test]
    async fn test_search_keeps_catalog_order() {
        let mut mock = MockCatalogProvider::new();
        mock.expect_search_movies()
            .withf(|query, year| query.trim() == "Alien" && year.is_none())
            .times(1)
            .returning(|_, _| Ok(vec![movie(348, "Alien"), movie(679, "Aliens")]));

        let results = search_titles(Arc::new(mock), "Alien", None).await.unwrap();

        let ids: Vec<u64> = results.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![348, 679]);
    }

    #[tokio::test]
    async fn test_details_propagates_not_found() {
        let mut mock = MockCatalogProvider::new();
        mock.expect_movie_details()
            .returning(|id| Err(AppError::NotFound(format!("movie/{}", id))));

        let result = movie_details(Arc::new(mock), 42).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
