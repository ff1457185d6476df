use reqwest::Url;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};

/// Dummy origin used only to percent-encode query strings for signatures
const SIGNATURE_ORIGIN: &str = "http://catalog.invalid/";

/// Outbound catalog request, identified by endpoint and query parameters
///
/// The access credential is never part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    MovieSearch { query: String, year: Option<i32> },
    MovieDetails(u64),
}

impl CacheKey {
    /// Endpoint path relative to the catalog base URL
    pub fn endpoint(&self) -> String {
        match self {
            CacheKey::MovieSearch { .. } => "search/movie".to_string(),
            CacheKey::MovieDetails(id) => format!("movie/{}", id),
        }
    }

    /// Query parameters in the order they are sent
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            CacheKey::MovieSearch { query, year } => {
                let mut params = vec![
                    ("query", query.clone()),
                    ("include_adult", "false".to_string()),
                ];
                if let Some(year) = year {
                    params.push(("year", year.to_string()));
                }
                params
            }
            CacheKey::MovieDetails(_) => Vec::new(),
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params = self.query_params();
        if params.is_empty() {
            return write!(f, "{}", self.endpoint());
        }

        let encoded =
            Url::parse_with_params(SIGNATURE_ORIGIN, &params).map_err(|_| std::fmt::Error)?;
        write!(f, "{}?{}", self.endpoint(), encoded.query().unwrap_or_default())
    }
}

/// In-memory store of raw catalog responses keyed by request signature
///
/// Entries never expire; they are only removed through `invalidate_prefix`
/// or `clear`. Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves a value from the cache by key
    ///
    /// The stored raw response is deserialized into `T`. If the key does not
    /// exist in the cache, `None` is returned.
    pub async fn get_from_cache<T: DeserializeOwned>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        let entries = self.entries.read().await;

        match entries.get(&key.to_string()) {
            Some(raw) => {
                let data = serde_json::from_value(raw.clone()).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Stores a value under the request signature of `key`
    pub async fn store<T: Serialize>(&self, key: &CacheKey, value: &T) -> AppResult<()> {
        let raw = serde_json::to_value(value)
            .map_err(|e| AppError::Internal(format!("Cache serialization error: {}", e)))?;

        self.entries.write().await.insert(key.to_string(), raw);
        Ok(())
    }

    /// Removes every entry whose signature starts with `prefix`
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|signature, _| !signature.starts_with(prefix));
        let removed = before - entries.len();

        tracing::info!(prefix = %prefix, removed, "Invalidated cached catalog responses");
        removed
    }

    /// Removes every entry
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();

        tracing::info!(removed, "Cleared catalog response cache");
        removed
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search(query: &str, year: Option<i32>) -> CacheKey {
        CacheKey::MovieSearch {
            query: query.to_string(),
            year,
        }
    }

    #[test]
    fn test_cache_key_display_search() {
        let key = search("Inception", None);
        assert_eq!(
            format!("{}", key),
            "search/movie?query=Inception&include_adult=false"
        );
    }

    #[test]
    fn test_cache_key_display_search_with_year() {
        let key = search("The Matrix", Some(1999));
        assert_eq!(
            format!("{}", key),
            "search/movie?query=The+Matrix&include_adult=false&year=1999"
        );
    }

    #[test]
    fn test_cache_key_display_keeps_case_and_encodes() {
        let key = search("Amélie & Co", None);
        assert_eq!(
            format!("{}", key),
            "search/movie?query=Am%C3%A9lie+%26+Co&include_adult=false"
        );
        assert_ne!(key.to_string(), search("amélie & co", None).to_string());
    }

    #[test]
    fn test_cache_key_display_details() {
        let key = CacheKey::MovieDetails(603);
        assert_eq!(format!("{}", key), "movie/603");
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let cache = ResponseCache::new();
        let retrieved: Option<serde_json::Value> =
            cache.get_from_cache(&search("nothing", None)).await.unwrap();

        assert_eq!(retrieved, None);
    }

    #[tokio::test]
    async fn test_store_then_get() {
        let cache = ResponseCache::new();
        let key = search("Heat", Some(1995));
        let value = json!({"page": 1, "results": []});

        cache.store(&key, &value).await.unwrap();

        let retrieved: Option<serde_json::Value> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));

        // Same query without the year is a different request
        let other: Option<serde_json::Value> =
            cache.get_from_cache(&search("Heat", None)).await.unwrap();
        assert_eq!(other, None);
    }

    #[tokio::test]
    async fn test_invalidate_prefix() {
        let cache = ResponseCache::new();
        cache.store(&search("Heat", None), &json!(1)).await.unwrap();
        cache.store(&search("Alien", None), &json!(2)).await.unwrap();
        cache.store(&CacheKey::MovieDetails(949), &json!(3)).await.unwrap();

        let removed = cache.invalidate_prefix("search/movie").await;

        assert_eq!(removed, 2);
        assert_eq!(cache.len().await, 1);
        let details: Option<serde_json::Value> =
            cache.get_from_cache(&CacheKey::MovieDetails(949)).await.unwrap();
        assert_eq!(details, Some(json!(3)));
    }

    #[tokio::test]
    async fn test_clear_is_shared_between_clones() {
        let cache = ResponseCache::new();
        let handle = cache.clone();
        cache.store(&CacheKey::MovieDetails(1), &json!(1)).await.unwrap();

        assert_eq!(handle.len().await, 1);
        assert_eq!(handle.clear().await, 1);
        assert!(cache.is_empty().await);
    }
}
