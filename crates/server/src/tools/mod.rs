//! MCP tool implementations.
//!
//! This module contains the two tools exposed by the server, plus the
//! shared glue that turns pipeline outcomes into structured JSON tool
//! results. Failures are reported inside the tool result body (stable
//! `error.code`/`error.message`), never as raw protocol errors, so a
//! calling agent always sees the same JSON contract.

pub mod analyze;
pub mod parse_article;

use rmcp::model::{CallToolResult, Content};
use wxarticle_client::FetchError;
use wxarticle_core::Error;

/// Render a JSON payload as a tool result.
pub(crate) fn json_result(value: &serde_json::Value) -> CallToolResult {
    CallToolResult::success(vec![Content::text(serde_json::to_string_pretty(value).unwrap_or_default())])
}

/// Render a classified pipeline failure as a structured JSON body.
///
/// Diagnostic detail is logged; the caller receives only the stable
/// code and message.
pub(crate) fn error_result(err: &Error) -> CallToolResult {
    tracing::error!("tool failed: {err}");
    json_result(&serde_json::json!({
        "success": false,
        "error": { "code": err.code(), "message": err.message() }
    }))
}

/// Normalize a string-typed boolean flag at the boundary.
pub(crate) fn truthy(flag: &str) -> bool {
    matches!(flag.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

/// Classify a fetch failure into the error taxonomy.
pub(crate) fn classify_fetch_error(err: FetchError) -> Error {
    if err.is_not_found() {
        return Error::NotFound("Article not found. Please check the URL.".into());
    }
    match err {
        FetchError::Timeout(_) => Error::Timeout("Request timed out. Please try again.".into()),
        other => Error::ParseError(format!("Failed to fetch article: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy_flag_values() {
        for flag in ["true", "TRUE", "1", "yes", "on", " True "] {
            assert!(truthy(flag), "{flag:?} should be truthy");
        }
        for flag in ["false", "0", "no", "off", "", "maybe"] {
            assert!(!truthy(flag), "{flag:?} should be falsy");
        }
    }

    #[test]
    fn test_classify_fetch_not_found() {
        let err = classify_fetch_error(FetchError::Status { status: 404 });
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_classify_fetch_timeout() {
        let err = classify_fetch_error(FetchError::Timeout("deadline".into()));
        assert_eq!(err.code(), "TIMEOUT");
    }

    #[test]
    fn test_classify_fetch_other_statuses() {
        let err = classify_fetch_error(FetchError::Status { status: 500 });
        assert_eq!(err.code(), "PARSE_ERROR");

        let err = classify_fetch_error(FetchError::Network("refused".into()));
        assert_eq!(err.code(), "PARSE_ERROR");
    }

    #[test]
    fn test_error_result_body_shape() {
        let result = error_result(&Error::InvalidUrl("bad".into()));
        let value = serde_json::to_value(&result).unwrap();
        let text = value["content"][0]["text"].as_str().unwrap();
        let body: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "INVALID_URL");
        assert_eq!(body["error"]["message"], "bad");
    }
}
