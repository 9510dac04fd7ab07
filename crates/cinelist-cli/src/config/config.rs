//! `AppConfig` struct and TOML loading.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use cinelist_core::DEFAULT_QUERY;

/// Environment variable that overrides `[omdb] api_key`.
pub const API_KEY_ENV: &str = "OMDB_API_KEY";

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// OMDb access settings.
    #[serde(default)]
    pub omdb: OmdbConfig,
    /// Search list settings.
    #[serde(default)]
    pub search: SearchConfig,
}

/// `[omdb]` section.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct OmdbConfig {
    /// API key sent as `apikey`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Endpoint override (tests, mirrors).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Minimum spacing between requests in milliseconds.
    #[serde(default)]
    pub min_interval_ms: Option<u64>,
    /// Transport timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// `[search]` section.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchConfig {
    /// Query used on startup and when refreshing without a query.
    #[serde(default = "default_query")]
    pub default_query: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_query: default_query(),
        }
    }
}

fn default_query() -> String {
    String::from(DEFAULT_QUERY)
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Picks the API key: a non-blank `env_key` wins over the file.
    ///
    /// # Errors
    ///
    /// Returns an error if neither source has a non-blank key.
    pub fn api_key(&self, env_key: Option<String>) -> Result<String> {
        env_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                self.omdb
                    .api_key
                    .clone()
                    .filter(|k| !k.trim().is_empty())
            })
            .ok_or_else(|| {
                anyhow!("OMDb API key is required: set {API_KEY_ENV} or [omdb] api_key")
            })
    }

    /// `[omdb] min_interval_ms` as a duration.
    #[must_use]
    pub fn min_interval(&self) -> Option<Duration> {
        self.omdb.min_interval_ms.map(Duration::from_millis)
    }

    /// `[omdb] timeout_secs` as a duration.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.omdb.timeout_secs.map(Duration::from_secs)
    }
}
