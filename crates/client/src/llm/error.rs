//! LLM client error types and transient-failure classification.

use std::sync::Arc;

/// Errors from the Zhipu AI chat-completion client.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Missing API key: neither ZHIPU_API_KEY nor configuration provides one.
    #[error("ZHIPU_API_KEY not found. Please set ZHIPU_API_KEY environment variable in MCP configuration.")]
    MissingApiKey,

    /// Authentication failed (key rejected by the API).
    #[error("authentication failed: API key rejected")]
    AuthRejected,

    /// Request timeout.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Connection could not be established.
    #[error("connection error: {0}")]
    Connect(String),

    /// Other network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// HTTP error response from the API.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Response body was not valid JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// Response parsed but had no completion choices with content.
    #[error("Invalid response from Zhipu AI API")]
    InvalidResponse,
}

impl LlmError {
    /// Whether this failure is likely to succeed on retry.
    ///
    /// Only connection-establishment and timeout failures are transient;
    /// everything else (HTTP status, malformed body, bad credentials)
    /// propagates without retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::Timeout(_) | LlmError::Connect(_))
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(err.to_string())
        } else if err.is_connect() {
            LlmError::Connect(err.to_string())
        } else {
            LlmError::Network(Arc::new(err))
        }
    }
}
