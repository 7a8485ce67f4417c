//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (GFI_*)
//! 2. TOML config file (if GFI_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (GFI_*)
/// 2. TOML config file (if GFI_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// GitHub token for authenticated search (higher rate limit).
    ///
    /// Set via GFI_GITHUB_TOKEN environment variable.
    #[serde(default)]
    pub github_token: Option<String>,

    /// GitHub REST API base URL.
    ///
    /// Set via GFI_API_BASE_URL environment variable.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via GFI_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via GFI_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Lifetime of cached search results in seconds.
    ///
    /// Set via GFI_CACHE_TTL_SECS environment variable.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Path to a SQLite session store. Without it the cache lives in memory.
    ///
    /// Set via GFI_DB_PATH environment variable.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Session id to resume. A fresh one is generated when unset.
    ///
    /// Set via GFI_SESSION_ID environment variable.
    #[serde(default)]
    pub session_id: Option<String>,

    /// Page URL that share links are built on.
    ///
    /// Set via GFI_SHARE_BASE_URL environment variable.
    #[serde(default)]
    pub share_base_url: Option<String>,
}

fn default_api_base_url() -> String {
    "https://api.github.com".into()
}

fn default_user_agent() -> String {
    "good-first-issues/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_cache_ttl_secs() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            github_token: None,
            api_base_url: default_api_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            db_path: None,
            session_id: None,
            share_base_url: None,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache TTL as Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// The configured session id, or a new one unique to this process start.
    pub fn session_id_or_new(&self) -> String {
        self.session_id.clone().unwrap_or_else(|| {
            format!("{}-{}", std::process::id(), chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
        })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `GFI_`
    /// 2. TOML file from `GFI_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("GFI_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("GFI_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
