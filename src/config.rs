use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Language requested from TMDB
    #[serde(default = "default_tmdb_language")]
    pub tmdb_language: String,

    /// Prefix joined with a poster path to build the image URL
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    /// Poster returned when no image can be resolved
    #[serde(default = "default_placeholder_poster_url")]
    pub placeholder_poster_url: String,

    /// Movie records exported from the offline pipeline
    #[serde(default = "default_movies_path")]
    pub movies_path: String,

    /// Precomputed similarity matrix
    #[serde(default = "default_similarity_path")]
    pub similarity_path: String,

    /// Number of neighbors returned per query
    #[serde(default = "default_recommendation_count")]
    pub recommendation_count: usize,

    /// Per-request timeout for metadata calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Total poster attempts, including the first one
    #[serde(default = "default_poster_max_attempts")]
    pub poster_max_attempts: u32,

    /// Pause after a connection-level poster failure
    #[serde(default = "default_poster_retry_backoff_ms")]
    pub poster_retry_backoff_ms: u64,

    /// Redis connection URL. The in-process cache is used when unset.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Redis entry TTL in seconds, 0 keeps entries until the catalog reloads
    #[serde(default)]
    pub cache_ttl_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_language() -> String {
    "en-US".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500/".to_string()
}

fn default_placeholder_poster_url() -> String {
    "https://via.placeholder.com/500x750?text=No+Image+Available".to_string()
}

fn default_movies_path() -> String {
    "data/movies.json".to_string()
}

fn default_similarity_path() -> String {
    "data/similarity.json".to_string()
}

fn default_recommendation_count() -> usize {
    5
}

fn default_request_timeout_secs() -> u64 {
    5
}

fn default_poster_max_attempts() -> u32 {
    3
}

fn default_poster_retry_backoff_ms() -> u64 {
    2000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poster_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.poster_retry_backoff_ms)
    }

    pub fn cache_ttl(&self) -> Option<u64> {
        (self.cache_ttl_secs > 0).then_some(self.cache_ttl_secs)
    }
}
