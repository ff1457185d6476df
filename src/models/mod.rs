use serde::{Deserialize, Serialize};

pub mod import;
pub mod movie_match;

pub use import::{ColumnType, CsvColumn, CsvFormat, ParsedTable, RowFields};
pub use movie_match::{MatchFilter, MatchResolution, MatchStatus, MatchSummary, MovieMatch};

pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
pub const BACKDROP_BASE_URL: &str = "https://image.tmdb.org/t/p/original";
pub const POSTER_PLACEHOLDER: &str = "/placeholder.svg";

// ============================================================================
// TMDB API Types
// ============================================================================

/// A movie as returned by the TMDB search and details endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    /// `YYYY-MM-DD`; TMDB sends an empty string for unknown dates
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
}

impl CatalogMovie {
    /// Year part of the release date, if one is known
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|date| date.split('-').next())
            .and_then(|year| year.trim().parse().ok())
    }

    pub fn poster_url(&self) -> String {
        poster_url(self.poster_path.as_deref())
    }

    pub fn backdrop_url(&self) -> String {
        backdrop_url(self.backdrop_path.as_deref())
    }
}

/// Response from GET /search/movie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<CatalogMovie>,
    #[serde(default)]
    pub total_results: u32,
    #[serde(default)]
    pub total_pages: u32,
}

/// Full poster URL for an image path, or the placeholder image
pub fn poster_url(path: Option<&str>) -> String {
    match path {
        Some(path) if !path.is_empty() => format!("{}{}", POSTER_BASE_URL, path),
        _ => POSTER_PLACEHOLDER.to_string(),
    }
}

/// Full backdrop URL for an image path, or an empty string
pub fn backdrop_url(path: Option<&str>) -> String {
    match path {
        Some(path) if !path.is_empty() => format!("{}{}", BACKDROP_BASE_URL, path),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_movie_deserialization() {
        let json = r#"{
            "id": 872585,
            "title": "Oppenheimer",
            "original_title": "Oppenheimer",
            "release_date": "2023-07-19",
            "poster_path": "/8Gxv8gSFCU0XGDykEGv7zR1n2ua.jpg",
            "backdrop_path": null,
            "overview": "The story of J. Robert Oppenheimer.",
            "genre_ids": [18, 36],
            "popularity": 512.3,
            "vote_average": 8.1,
            "vote_count": 9000,
            "adult": false
        }"#;

        let movie: CatalogMovie = serde_json::from_str(json).unwrap();
        assert_eq!(movie.id, 872585);
        assert_eq!(movie.title, "Oppenheimer");
        assert_eq!(movie.release_year(), Some(2023));
        assert_eq!(movie.backdrop_path, None);
        assert_eq!(movie.vote_count, 9000);
    }

    #[test]
    fn test_release_year_missing_or_empty() {
        let json = r#"{"id": 1, "title": "Untitled", "release_date": ""}"#;
        let movie: CatalogMovie = serde_json::from_str(json).unwrap();
        assert_eq!(movie.release_year(), None);

        let json = r#"{"id": 2, "title": "Untitled"}"#;
        let movie: CatalogMovie = serde_json::from_str(json).unwrap();
        assert_eq!(movie.release_year(), None);
        assert_eq!(movie.original_title, "");
        assert_eq!(movie.popularity, 0.0);
    }

    #[test]
    fn test_search_response_deserialization() {
        let json = r#"{
            "page": 1,
            "results": [{"id": 603, "title": "The Matrix", "original_title": "The Matrix"}],
            "total_results": 1,
            "total_pages": 1
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].id, 603);
        assert_eq!(response.total_pages, 1);
    }

    #[test]
    fn test_image_urls() {
        assert_eq!(
            poster_url(Some("/abc.jpg")),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
        assert_eq!(poster_url(None), "/placeholder.svg");
        assert_eq!(
            backdrop_url(Some("/bg.jpg")),
            "https://image.tmdb.org/t/p/original/bg.jpg"
        );
        assert_eq!(backdrop_url(None), "");
    }
}
