/// TMDB (The Movie Database) provider
///
/// API Flow:
/// 1. Title Search: /search/movie?query=..&include_adult=false[&year=..]
/// 2. Details: /movie/{id}
///
/// Every successful response is kept in the shared [`ResponseCache`] under its
/// request signature, so repeated lookups during an import never hit the
/// network twice. Rate limiting (429) honours `Retry-After`; other transient
/// failures back off exponentially. Both share one attempt budget.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{header::HeaderMap, Client as HttpClient, StatusCode};
use serde::Deserialize;

use crate::{
    cache::{CacheKey, ResponseCache},
    cached,
    config::{Config, DEFAULT_TMDB_API_URL},
    error::{AppError, AppResult},
    models::{CatalogMovie, SearchResponse},
    services::providers::CatalogProvider,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Credentials and endpoint for the catalog
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSettings {
    pub access_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Attempt budget and backoff for catalog requests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    /// Delay after the first transient failure; doubles on each further one
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Credentials {
    api_key: String,
    api_url: String,
}

/// Outcome of a single HTTP attempt
enum Attempt {
    Success(serde_json::Value),
    RateLimited(Duration),
    Transient(String),
}

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    credentials: Arc<RwLock<Option<Credentials>>>,
    cache: ResponseCache,
    retry: RetryPolicy,
}

impl TmdbProvider {
    /// Creates an unconfigured provider; searches fail until `configure` is called
    pub fn new(cache: ResponseCache) -> Self {
        let http_client = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            credentials: Arc::new(RwLock::new(None)),
            cache,
            retry: RetryPolicy::default(),
        }
    }

    /// Creates a provider from application config, configured when a key is present
    pub fn from_config(config: &Config, cache: ResponseCache) -> AppResult<Self> {
        let provider = Self::new(cache).with_retry_policy(RetryPolicy {
            max_attempts: config.catalog_max_attempts.max(1),
            base_delay: Duration::from_millis(config.catalog_retry_base_ms),
        });

        match config.tmdb_api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => {
                provider.store_credentials(CatalogSettings {
                    access_key: key.to_string(),
                    base_url: Some(config.tmdb_api_url.clone()),
                })?;
            }
            _ => tracing::warn!("TMDB_API_KEY not set; catalog lookups disabled until configured"),
        }

        Ok(provider)
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_http_client(mut self, http_client: HttpClient) -> Self {
        self.http_client = http_client;
        self
    }

    /// Sets (or replaces) the access key and base URL
    ///
    /// Cached responses belong to the previous host and key, so they are
    /// dropped whenever either changes.
    pub async fn configure(&self, settings: CatalogSettings) -> AppResult<()> {
        if self.store_credentials(settings)? {
            let removed = self.cache.clear().await;
            tracing::info!(removed, provider = "tmdb", "Catalog changed; dropped cached responses");
        }
        Ok(())
    }

    /// Returns whether previously configured credentials were replaced
    fn store_credentials(&self, settings: CatalogSettings) -> AppResult<bool> {
        let api_key = settings.access_key.trim().to_string();
        if api_key.is_empty() {
            return Err(AppError::InvalidInput(
                "Access key cannot be empty".to_string(),
            ));
        }

        let api_url = settings
            .base_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TMDB_API_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        let next = Credentials { api_key, api_url };

        let mut credentials = self
            .credentials
            .write()
            .map_err(|_| AppError::Internal("Catalog credentials lock poisoned".to_string()))?;
        let replaced = credentials.as_ref().is_some_and(|current| *current != next);

        tracing::info!(api_url = %next.api_url, provider = "tmdb", "Catalog configured");
        *credentials = Some(next);

        Ok(replaced)
    }

    pub fn is_configured(&self) -> bool {
        self.credentials
            .read()
            .map(|credentials| credentials.is_some())
            .unwrap_or(false)
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    fn credentials(&self) -> AppResult<Credentials> {
        let credentials = self
            .credentials
            .read()
            .map_err(|_| AppError::Internal("Catalog credentials lock poisoned".to_string()))?;

        credentials.clone().ok_or_else(|| {
            AppError::Configuration(
                "TMDB access key is not set; configure the catalog first".to_string(),
            )
        })
    }

    /// Raw JSON for `key`, from cache or the network
    async fn fetch_json(&self, key: &CacheKey) -> AppResult<serde_json::Value> {
        let credentials = self.credentials()?;

        cached!(self.cache, key, self.request_with_retry(&credentials, key))
    }

    async fn request_with_retry(
        &self,
        credentials: &Credentials,
        key: &CacheKey,
    ) -> AppResult<serde_json::Value> {
        retry_with_backoff(&self.retry, key, || self.send_once(credentials, key)).await
    }

    /// One HTTP round trip; `Err` only for failures retrying cannot fix
    async fn send_once(&self, credentials: &Credentials, key: &CacheKey) -> AppResult<Attempt> {
        let url = format!("{}/{}", credentials.api_url, key.endpoint());

        tracing::debug!(key = %key, "Fetching from TMDB");

        let response = match self
            .http_client
            .get(&url)
            .query(&[("api_key", credentials.api_key.as_str())])
            .query(&key.query_params())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Ok(Attempt::Transient(e.to_string())),
        };

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(Attempt::RateLimited(retry_after(response.headers())));
        }

        if status.is_success() {
            return Ok(match response.json::<serde_json::Value>().await {
                Ok(payload) => Attempt::Success(payload),
                Err(e) => Attempt::Transient(format!("unreadable response body: {}", e)),
            });
        }

        if status.is_server_error() {
            return Ok(Attempt::Transient(format!("status {}", status)));
        }

        let body = response.text().await?;
        tracing::error!(
            key = %key,
            status = %status,
            body = %body,
            "TMDB request rejected"
        );

        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("{} not found in catalog", key)));
        }

        Err(AppError::ExternalApi(format!(
            "TMDB API returned status {}: {}",
            status, body
        )))
    }
}

/// Drives `attempt` until it succeeds, fails hard, or the budget runs out
///
/// Rate limits wait for the server's hint; transient failures wait
/// `base_delay`, doubling each time. Nothing sleeps after the final attempt.
async fn retry_with_backoff<F, Fut>(
    policy: &RetryPolicy,
    key: &CacheKey,
    mut attempt: F,
) -> AppResult<serde_json::Value>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = AppResult<Attempt>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut backoff = policy.base_delay;

    for attempt_no in 1..=max_attempts {
        let is_last = attempt_no == max_attempts;

        match attempt().await? {
            Attempt::Success(payload) => return Ok(payload),
            Attempt::RateLimited(wait) => {
                tracing::warn!(
                    key = %key,
                    attempt = attempt_no,
                    wait_ms = wait.as_millis() as u64,
                    "Rate limited by TMDB"
                );
                if !is_last {
                    tokio::time::sleep(wait).await;
                }
            }
            Attempt::Transient(reason) => {
                tracing::warn!(
                    key = %key,
                    attempt = attempt_no,
                    reason = %reason,
                    "TMDB request failed"
                );
                if !is_last {
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
    }

    tracing::error!(key = %key, attempts = max_attempts, "TMDB retry budget exhausted");
    Err(AppError::CatalogUnavailable(format!(
        "{} failed after {} attempts",
        key, max_attempts
    )))
}

/// Wait requested by a 429 response; whole seconds, 1s when absent or unreadable
fn retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn search_movies(&self, query: &str, year: Option<i32>) -> AppResult<Vec<CatalogMovie>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let key = CacheKey::MovieSearch {
            query: query.to_string(),
            year,
        };
        let payload = self.fetch_json(&key).await?;

        let response: SearchResponse = serde_json::from_value(payload).map_err(|e| {
            AppError::ExternalApi(format!("Failed to parse TMDB search response: {}", e))
        })?;

        tracing::info!(
            query = %query,
            year = ?year,
            results = response.results.len(),
            provider = "tmdb",
            "Title search completed"
        );

        Ok(response.results)
    }

    async fn movie_details(&self, id: u64) -> AppResult<CatalogMovie> {
        let payload = self.fetch_json(&CacheKey::MovieDetails(id)).await?;

        serde_json::from_value(payload).map_err(|e| {
            AppError::ExternalApi(format!("Failed to parse TMDB movie details: {}", e))
        })
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
