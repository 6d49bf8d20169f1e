//! WeChat article URL validation.
//!
//! Validation happens before any network I/O and fails closed: empty or
//! out-of-domain input is rejected with a reason the caller can surface.

/// Error type for article URL validation failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("URL cannot be empty. Please provide a valid WeChat article URL.")]
    Empty,

    #[error("Invalid WeChat article URL. Please provide a URL from mp.weixin.qq.com")]
    NotWeChat,

    #[error("Invalid WeChat article URL. Please provide a URL from mp.weixin.qq.com ({0})")]
    Malformed(String),
}

/// Validate that the input is a WeChat public-account article URL.
///
/// Accepted hosts are `mp.weixin.qq.com` and the root `weixin.qq.com`,
/// over http or https. Returns the parsed URL on success.
pub fn validate_wechat_url(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let parsed = url::Url::parse(trimmed).map_err(|e| UrlError::Malformed(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlError::NotWeChat),
    }

    match parsed.host_str() {
        Some("mp.weixin.qq.com") | Some("weixin.qq.com") => Ok(parsed),
        _ => Err(UrlError::NotWeChat),
    }
}
