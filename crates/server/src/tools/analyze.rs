//! analyze_with_llm tool implementation.
//!
//! Resolves article content (from a URL fetch or directly supplied text),
//! builds the mode-specific analysis prompt, calls the LLM, sanitizes the
//! output, and writes the analysis report. Unlike the summary flow, a
//! failed report write is a hard error here.

use std::path::PathBuf;

use chrono::Local;
use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wxarticle_client::{
    AnalysisMode, DEFAULT_MODEL, FetchClient, FetchConfig, LlmError, ReportKind, ZhipuClient, ZhipuConfig,
    analysis_prompt, extract_article, render_analysis_report, report_filename, strip_code_fences,
    validate_wechat_url, write_report,
};
use wxarticle_core::{AppConfig, Error};

use crate::tools::{classify_fetch_error, error_result, json_result};

/// Input parameters for the analyze_with_llm tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeWithLlmParams {
    /// WeChat article URL. When present, content is fetched and extracted.
    #[serde(default)]
    pub url: Option<String>,

    /// Article title, used when content is supplied directly.
    #[serde(default)]
    pub title: Option<String>,

    /// Article author, used when content is supplied directly.
    #[serde(default)]
    pub author: Option<String>,

    /// Article body text, alternative to `url`.
    #[serde(default)]
    pub content: Option<String>,

    /// Explicit output path for the report. Defaults to the configured
    /// output directory with a derived filename.
    #[serde(default)]
    pub save_path: Option<String>,

    /// Model identifier (default "glm-4").
    #[serde(default)]
    pub model: Option<String>,

    /// Analysis mode: "comprehensive" (default), "viewpoint", or "structure".
    #[serde(default)]
    pub analysis_type: Option<String>,
}

/// Implementation of the analyze_with_llm tool.
pub async fn analyze_impl(config: &AppConfig, params: AnalyzeWithLlmParams) -> CallToolResult {
    tracing::info!(
        "LLM analysis request: url={:?}, type={:?}, model={:?}",
        params.url,
        params.analysis_type,
        params.model
    );

    match run(config, &params).await {
        Ok(value) => json_result(&value),
        Err(err) => error_result(&err),
    }
}

async fn run(config: &AppConfig, params: &AnalyzeWithLlmParams) -> Result<serde_json::Value, Error> {
    let mut title = params.title.clone().unwrap_or_default();
    let mut author = params.author.clone().unwrap_or_default();
    let mut content = params.content.clone().unwrap_or_default();

    if let Some(url_param) = params.url.as_deref().filter(|u| !u.trim().is_empty()) {
        let url = validate_wechat_url(url_param).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let client = FetchClient::new(FetchConfig::from_app(config)).map_err(|e| Error::Internal(e.to_string()))?;
        let response = client.fetch(&url).await.map_err(classify_fetch_error)?;

        let article = extract_article(
            url.as_str(),
            &response.text(),
            &response.charset,
            response.content_type.as_deref().unwrap_or(""),
            true,
        );

        title = article.title;
        author = article.author;
        content = article.body_text;
    }

    if content.is_empty() {
        return Err(Error::MissingContent(
            "Article content is required. Please provide either URL or content parameter.".into(),
        ));
    }

    if title.is_empty() {
        title = "未命名文章".to_string();
    }

    let mode = AnalysisMode::parse(params.analysis_type.as_deref().unwrap_or("comprehensive"));
    let model = params.model.as_deref().unwrap_or(DEFAULT_MODEL);

    let prompt = analysis_prompt(mode, &title, &author, &content);
    let content_chars = content.chars().count();

    tracing::info!(
        "calling LLM for analysis: type={}, model={}, content_length={}",
        mode.as_str(),
        model,
        content_chars
    );

    let client = ZhipuClient::new(ZhipuConfig::from_app(config).map_err(classify_llm_error)?)
        .map_err(classify_llm_error)?;
    let raw = client.chat(&prompt, model, 4000, 0.3).await.map_err(classify_llm_error)?;

    let analysis = strip_code_fences(&raw);

    let now = Local::now();
    let document = render_analysis_report(&title, &author, mode, model, content_chars, &analysis, &now);

    let output_path = match params.save_path.as_deref().filter(|p| !p.is_empty()) {
        Some(path) => PathBuf::from(path),
        None => config
            .output_dir
            .join(report_filename(&title, ReportKind::Analysis(mode), &now)),
    };

    // Hard error in the analysis flow: no report, no success.
    let (absolute, file_size) = write_report(&output_path, &document)
        .await
        .map_err(|e| Error::Internal(format!("Failed to save analysis report: {e}")))?;

    Ok(serde_json::json!({
        "success": true,
        "message": "LLM analysis completed successfully",
        "file_path": absolute.to_string_lossy(),
        "file_size": file_size,
        "article_info": {
            "title": title,
            "author": author,
            "content_length": content_chars,
        },
        "analysis_info": {
            "type": mode.as_str(),
            "model": model,
            "provider": "zhipu",
            "method": "LLM semantic analysis",
        }
    }))
}

/// Classify an LLM-client failure into the error taxonomy.
fn classify_llm_error(err: LlmError) -> Error {
    match err {
        LlmError::MissingApiKey | LlmError::AuthRejected => Error::ApiKeyError(
            "Zhipu AI API key not found. Please set ZHIPU_API_KEY environment variable in MCP configuration."
                .into(),
        ),
        LlmError::Timeout(msg) => Error::Timeout(format!("LLM request timed out: {msg}")),
        other => Error::LlmError(format!("Failed to analyze with Zhipu AI: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(result: &CallToolResult) -> serde_json::Value {
        let value = serde_json::to_value(result).unwrap();
        let text = value["content"][0]["text"].as_str().unwrap();
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_missing_url_and_content() {
        let config = AppConfig::default();
        let params = AnalyzeWithLlmParams::default();

        let body = body_of(&analyze_impl(&config, params).await);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "MISSING_CONTENT");
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let config = AppConfig::default();
        let params = AnalyzeWithLlmParams { url: Some("https://example.com/page".into()), ..Default::default() };

        let body = body_of(&analyze_impl(&config, params).await);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "INVALID_URL");
    }

    #[tokio::test]
    async fn test_direct_content_without_key_is_api_key_error() {
        // Direct content skips the fetch; the first hard dependency is the
        // credential. Only meaningful when no key is exported.
        if std::env::var("ZHIPU_API_KEY").is_ok() {
            return;
        }

        let config = AppConfig::default();
        let params = AnalyzeWithLlmParams {
            title: Some("标题".into()),
            content: Some("正文内容".into()),
            ..Default::default()
        };

        let body = body_of(&analyze_impl(&config, params).await);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "API_KEY_ERROR");
    }

    #[test]
    fn test_classify_llm_errors() {
        assert_eq!(classify_llm_error(LlmError::MissingApiKey).code(), "API_KEY_ERROR");
        assert_eq!(classify_llm_error(LlmError::AuthRejected).code(), "API_KEY_ERROR");
        assert_eq!(classify_llm_error(LlmError::Timeout("t".into())).code(), "TIMEOUT");
        assert_eq!(classify_llm_error(LlmError::Connect("c".into())).code(), "LLM_ERROR");
        assert_eq!(classify_llm_error(LlmError::HttpError { status: 500 }).code(), "LLM_ERROR");
        assert_eq!(classify_llm_error(LlmError::InvalidResponse).code(), "LLM_ERROR");
    }
}
