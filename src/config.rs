use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key; the catalog stays unconfigured when absent
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of catalog lookups run together per group
    #[serde(default = "default_match_batch_size")]
    pub match_batch_size: usize,

    /// Pause between lookup groups, in milliseconds
    #[serde(default = "default_match_batch_delay_ms")]
    pub match_batch_delay_ms: u64,

    /// Total attempts per catalog request (including the first one)
    #[serde(default = "default_catalog_max_attempts")]
    pub catalog_max_attempts: u32,

    /// First backoff delay after a failed catalog request, in milliseconds
    #[serde(default = "default_catalog_retry_base_ms")]
    pub catalog_retry_base_ms: u64,
}

pub const DEFAULT_TMDB_API_URL: &str = "https://api.themoviedb.org/3";

fn default_tmdb_api_url() -> String {
    DEFAULT_TMDB_API_URL.to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_match_batch_size() -> usize {
    5
}

fn default_match_batch_delay_ms() -> u64 {
    500
}

fn default_catalog_max_attempts() -> u32 {
    3
}

fn default_catalog_retry_base_ms() -> u64 {
    1000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the HTTP listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_environment() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();

        assert_eq!(config.tmdb_api_key, None);
        assert_eq!(config.tmdb_api_url, DEFAULT_TMDB_API_URL);
        assert_eq!(config.match_batch_size, 5);
        assert_eq!(config.match_batch_delay_ms, 500);
        assert_eq!(config.catalog_max_attempts, 3);
        assert_eq!(config.catalog_retry_base_ms, 1000);
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_overrides_from_environment() {
        let vars = vec![
            ("TMDB_API_KEY".to_string(), "abc123".to_string()),
            ("PORT".to_string(), "8080".to_string()),
            ("MATCH_BATCH_SIZE".to_string(), "2".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.tmdb_api_key.as_deref(), Some("abc123"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.match_batch_size, 2);
    }
}
