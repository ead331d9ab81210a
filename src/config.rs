//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::DEFAULT_TTL_HOURS;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the static drug reference dataset
    pub data_path: PathBuf,
    /// Path to the SQLite cache database
    pub cache_db_path: PathBuf,
    /// Cache TTL in hours, applied uniformly to every entry
    pub cache_ttl_hours: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the openFDA API
    pub openfda_base_url: String,
    /// Optional openFDA API key
    pub openfda_api_key: Option<String>,
    /// Maximum openFDA requests per rolling minute
    pub fda_rate_limit_per_minute: usize,
    /// Per-request timeout for openFDA calls in seconds
    pub fda_timeout_secs: u64,
    /// OpenAI API key; the summarizer is disabled when absent
    pub openai_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API
    pub openai_base_url: String,
    /// Chat model used for summaries
    pub openai_model: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DRUG_DATA_PATH` - Reference dataset (default: data/drugs_reference.json)
    /// - `CACHE_DB_PATH` - SQLite cache file (default: data/cache.db)
    /// - `CACHE_TTL_HOURS` - Cache TTL in hours (default: 24)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `OPENFDA_BASE_URL` - openFDA base (default: https://api.fda.gov)
    /// - `OPENFDA_API_KEY` - optional openFDA key
    /// - `FDA_RATE_LIMIT_PER_MINUTE` - request budget (default: 60)
    /// - `FDA_TIMEOUT_SECS` - request timeout (default: 10)
    /// - `OPENAI_API_KEY` - enables AI summaries when set
    /// - `OPENAI_BASE_URL` - default: https://api.openai.com/v1
    /// - `OPENAI_MODEL` - default: gpt-5-nano
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset and unparseable numbers fall back
    /// to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Self {
            data_path: var("DRUG_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            cache_db_path: var("CACHE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_db_path),
            cache_ttl_hours: var("CACHE_TTL_HOURS")
                .and_then(|v| v.parse().ok())
                .filter(|&hours| ttl_hours_in_range(hours))
                .unwrap_or(defaults.cache_ttl_hours),
            server_port: var("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            openfda_base_url: var("OPENFDA_BASE_URL").unwrap_or(defaults.openfda_base_url),
            openfda_api_key: var("OPENFDA_API_KEY"),
            fda_rate_limit_per_minute: var("FDA_RATE_LIMIT_PER_MINUTE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fda_rate_limit_per_minute),
            fda_timeout_secs: var("FDA_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fda_timeout_secs),
            openai_api_key: var("OPENAI_API_KEY"),
            openai_base_url: var("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            openai_model: var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
        }
    }

    /// Cache TTL as a chrono duration; out-of-range values use the default.
    pub fn cache_ttl(&self) -> chrono::Duration {
        i64::try_from(self.cache_ttl_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .unwrap_or_else(|| chrono::Duration::hours(DEFAULT_TTL_HOURS))
    }

    /// openFDA request timeout.
    pub fn fda_timeout(&self) -> Duration {
        Duration::from_secs(self.fda_timeout_secs)
    }
}

/// True if `hours` converts to a chrono duration without overflow.
fn ttl_hours_in_range(hours: u64) -> bool {
    i64::try_from(hours)
        .ok()
        .and_then(chrono::Duration::try_hours)
        .is_some()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/drugs_reference.json"),
            cache_db_path: PathBuf::from("data/cache.db"),
            cache_ttl_hours: DEFAULT_TTL_HOURS as u64,
            server_port: 3000,
            openfda_base_url: "https://api.fda.gov".to_string(),
            openfda_api_key: None,
            fda_rate_limit_per_minute: 60,
            fda_timeout_secs: 10,
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-5-nano".to_string(),
        }
    }
}
