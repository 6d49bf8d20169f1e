//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (WX_ARTICLE_*)
//! 2. TOML config file (if WX_ARTICLE_CONFIG_FILE set)
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

/// Browser-identifying User-Agent used for article fetches. WeChat serves a
/// degraded page to clients it does not recognize as a browser.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                                  (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (WX_ARTICLE_*)
/// 2. TOML config file (if WX_ARTICLE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Zhipu AI API key for LLM calls.
    ///
    /// Set via WX_ARTICLE_ZHIPU_API_KEY environment variable. The bare
    /// ZHIPU_API_KEY variable takes precedence when present (see
    /// [`AppConfig::resolve_api_key`]).
    #[serde(default)]
    pub zhipu_api_key: Option<String>,

    /// Base directory for generated Markdown reports.
    ///
    /// Set via WX_ARTICLE_OUTPUT_DIR environment variable.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// User-Agent string for article fetches.
    ///
    /// Set via WX_ARTICLE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Article fetch timeout in milliseconds.
    ///
    /// Set via WX_ARTICLE_FETCH_TIMEOUT_MS environment variable.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// LLM request timeout in milliseconds. Large-model latency is high, so
    /// this defaults well above the fetch timeout.
    ///
    /// Set via WX_ARTICLE_LLM_TIMEOUT_MS environment variable.
    #[serde(default = "default_llm_timeout_ms")]
    pub llm_timeout_ms: u64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./reports")
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}

fn default_fetch_timeout_ms() -> u64 {
    30_000
}

fn default_llm_timeout_ms() -> u64 {
    120_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            zhipu_api_key: None,
            output_dir: default_output_dir(),
            user_agent: default_user_agent(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            llm_timeout_ms: default_llm_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Fetch timeout as a Duration for use with reqwest/tokio.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// LLM timeout as a Duration for use with reqwest/tokio.
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_millis(self.llm_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `WX_ARTICLE_`
    /// 2. TOML file from `WX_ARTICLE_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("WX_ARTICLE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("WX_ARTICLE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        tracing::debug!(
            output_dir = %config.output_dir.display(),
            fetch_timeout_ms = config.fetch_timeout_ms,
            llm_timeout_ms = config.llm_timeout_ms,
            "configuration loaded"
        );

        Ok(config)
    }

    /// Resolve the LLM credential: `ZHIPU_API_KEY` environment variable
    /// first, then the layered configuration value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if neither source yields a key.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        if let Ok(key) = std::env::var("ZHIPU_API_KEY")
            && !key.is_empty()
        {
            return Ok(key);
        }

        self.zhipu_api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "zhipu_api_key".into(),
                hint: "Set ZHIPU_API_KEY environment variable in MCP configuration".into(),
            })
    }
}
