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

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `fetch_timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `llm_timeout_ms` is less than 1s or exceeds 10 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_timeout_ms < 100 {
            return Err(ConfigError::Invalid {
                field: "fetch_timeout_ms".into(),
                reason: "must be at least 100ms".into(),
            });
        }
        if self.fetch_timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "fetch_timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.llm_timeout_ms < 1_000 {
            return Err(ConfigError::Invalid {
                field: "llm_timeout_ms".into(),
                reason: "must be at least 1000ms".into(),
            });
        }
        if self.llm_timeout_ms > 600_000 {
            return Err(ConfigError::Invalid {
                field: "llm_timeout_ms".into(),
                reason: "must not exceed 10 minutes (600000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid { field: "output_dir".into(), reason: "must not be empty".into() });
        }

        Ok(())
    }
}
