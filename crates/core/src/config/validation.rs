//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `cache_ttl_secs` is 0 or exceeds one day
    /// - `user_agent` or `api_base_url` is empty
    /// - `session_id` is set but empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid { field: "cache_ttl_secs".into(), reason: "must be greater than 0".into() });
        }
        if self.cache_ttl_secs > 86_400 {
            return Err(ConfigError::Invalid {
                field: "cache_ttl_secs".into(),
                reason: "must not exceed one day (86400s)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.api_base_url.is_empty() {
            return Err(ConfigError::Invalid { field: "api_base_url".into(), reason: "must not be empty".into() });
        }

        if self.session_id.as_deref() == Some("") {
            return Err(ConfigError::Invalid { field: "session_id".into(), reason: "must not be empty".into() });
        }

        if self.session_id.is_some() && self.db_path.is_none() {
            tracing::warn!("session_id is set without db_path; the in-memory cache cannot be resumed");
        }

        Ok(())
    }
}
