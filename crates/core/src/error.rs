//! Unified error taxonomy for the article pipeline.
//!
//! Every failure a tool can report to a caller carries one of these
//! stable string codes. Pipeline stages raise narrower errors; the
//! orchestrators re-classify them into this taxonomy before returning
//! anything to the client.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error for the article parsing and analysis pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input fails domain/non-empty URL validation; detected before any I/O.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Fetch failure whose underlying cause indicates a missing resource.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// Fetch or LLM-call failure caused by a timeout.
    #[error("TIMEOUT: {0}")]
    Timeout(String),

    /// Fetch succeeded but field extraction/parsing failed.
    #[error("PARSE_ERROR: {0}")]
    ParseError(String),

    /// Analysis requested without a URL and without directly supplied content.
    #[error("MISSING_CONTENT: {0}")]
    MissingContent(String),

    /// API credential absent or rejected.
    #[error("API_KEY_ERROR: {0}")]
    ApiKeyError(String),

    /// Any other LLM-call failure (non-retried class, or retries exhausted).
    #[error("LLM_ERROR: {0}")]
    LlmError(String),

    /// Safety net for uncaught failures; never the primary diagnostic.
    #[error("INTERNAL_ERROR: {0}")]
    Internal(String),
}

impl Error {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Timeout(_) => "TIMEOUT",
            Error::ParseError(_) => "PARSE_ERROR",
            Error::MissingContent(_) => "MISSING_CONTENT",
            Error::ApiKeyError(_) => "API_KEY_ERROR",
            Error::LlmError(_) => "LLM_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Human-readable message without the code prefix.
    pub fn message(&self) -> &str {
        match self {
            Error::InvalidUrl(m)
            | Error::NotFound(m)
            | Error::Timeout(m)
            | Error::ParseError(m)
            | Error::MissingContent(m)
            | Error::ApiKeyError(m)
            | Error::LlmError(m)
            | Error::Internal(m) => m,
        }
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidUrl(_) => -32602,
            Error::NotFound(_) => -32001,
            Error::Timeout(_) => -32002,
            Error::ParseError(_) => -32003,
            Error::MissingContent(_) => -32004,
            Error::ApiKeyError(_) => -32005,
            Error::LlmError(_) => -32006,
            Error::Internal(_) => -32000,
        };

        McpError { code: ErrorCode(code), message: err.message().to_string().into(), data: None }
    }
}
