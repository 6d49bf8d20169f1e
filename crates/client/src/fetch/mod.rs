//! HTTP fetch pipeline for WeChat article pages.
//!
//! ### Request shape
//! - Single GET with a realistic browser header set (User-Agent, Accept,
//!   Accept-Language), since WeChat degrades pages for unknown clients.
//! - Fixed timeout (default 30s), bounded redirects.
//!
//! ### Failure classes
//! - Non-2xx status, timeout, and transport errors are distinct variants so
//!   the orchestrator can classify them (`NOT_FOUND` vs `TIMEOUT` vs
//!   `PARSE_ERROR`) without string matching.

pub mod url;

use bytes::Bytes;
use reqwest::{Client, StatusCode, Url, header};
use std::time::{Duration, Instant};

pub use url::{UrlError, validate_wechat_url};

/// Errors from the article fetch pipeline.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Build(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("status {status}")]
    Status { status: u16 },

    #[error("failed to read response: {0}")]
    Read(String),
}

impl FetchError {
    /// Whether the underlying cause indicates a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status: 404 })
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { FetchError::Timeout(err.to_string()) } else { FetchError::Network(err.to_string()) }
    }
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Browser-identifying user agent string.
    pub user_agent: String,

    /// Request timeout (default: 30s).
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5).
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            timeout: Duration::from_millis(30_000),
            max_redirects: 5,
        }
    }
}

impl FetchConfig {
    /// Build a fetch configuration from application configuration.
    pub fn from_app(config: &wxarticle_core::AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.fetch_timeout(), ..Default::default() }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The original URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Charset from the Content-Type header (defaults to utf-8)
    pub charset: String,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Decoded response body as text (lossy UTF-8).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).to_string()
    }
}

/// HTTP fetch client for article pages.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| FetchError::Build(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Fetch an article page, returning raw bytes and response metadata.
    ///
    /// A non-2xx status is an error; the variant preserves the status code
    /// so callers can tell a missing article from a transport failure.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let start = Instant::now();

        tracing::info!("fetching article from: {}", url);

        let response = self
            .http
            .get(url.as_str())
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header(header::ACCEPT_LANGUAGE, "zh-CN,zh;q=0.9,en;q=0.8")
            .header(header::CONNECTION, "keep-alive")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16() });
        }

        let final_url = response.url().clone();

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let charset = content_type
            .as_deref()
            .and_then(parse_charset)
            .unwrap_or_else(|| "utf-8".to_string());

        let bytes = response.bytes().await.map_err(|e| FetchError::Read(e.to_string()))?;

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!("fetched {} -> {} in {}ms ({} bytes)", url, final_url, fetch_ms, bytes.len());

        Ok(FetchResponse { url: url.clone(), final_url, status, content_type, charset, bytes, fetch_ms })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

/// Extract the charset parameter from a Content-Type header value.
fn parse_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("charset="))
        .map(|cs| cs.trim_matches('"').to_ascii_lowercase())
}
