//! parse_article tool implementation.
//!
//! Validates the URL, fetches the full article, generates a detailed
//! third-person summary via the LLM, and optionally persists it as a
//! Markdown report. A failed report write is non-fatal here: the caller
//! still gets the summary, just without a `file_path`.

use chrono::Local;
use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wxarticle_client::{
    ArticleRecord, DEFAULT_MODEL, FetchClient, FetchConfig, ReportKind, ZhipuClient, ZhipuConfig, extract_article,
    render_summary_report, report_filename, summary_prompt, validate_wechat_url, write_report,
};
use wxarticle_core::{AppConfig, Error};

use crate::tools::{classify_fetch_error, error_result, json_result, truthy};

/// Bodies shorter than this (trimmed) skip the LLM and get a fixed notice.
const MIN_SUMMARY_CHARS: usize = 100;

/// Fallback summary length when the LLM call fails.
const FALLBACK_SUMMARY_CHARS: usize = 500;

/// Input parameters for the parse_article tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ParseArticleParams {
    /// WeChat article URL (mp.weixin.qq.com).
    pub url: String,

    /// Whether to save the summary as a Markdown file.
    /// String flag: "true"/"1"/"yes"/"on" are truthy (default "true").
    #[serde(default = "default_save_summary")]
    pub save_summary: String,
}

fn default_save_summary() -> String {
    "true".into()
}

/// Implementation of the parse_article tool.
pub async fn parse_article_impl(config: &AppConfig, params: ParseArticleParams) -> CallToolResult {
    tracing::info!("article parsing request: url={}, save_summary={}", params.url, params.save_summary);

    match run(config, &params).await {
        Ok(value) => json_result(&value),
        Err(err) => error_result(&err),
    }
}

async fn run(config: &AppConfig, params: &ParseArticleParams) -> Result<serde_json::Value, Error> {
    let url = validate_wechat_url(&params.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

    let client = FetchClient::new(FetchConfig::from_app(config)).map_err(|e| Error::Internal(e.to_string()))?;
    let response = client.fetch(&url).await.map_err(classify_fetch_error)?;

    let article = extract_article(
        url.as_str(),
        &response.text(),
        &response.charset,
        response.content_type.as_deref().unwrap_or(""),
        true,
    );

    tracing::info!("generating detailed summary using LLM...");
    let summary = generate_detailed_summary(config, &article).await;

    let mut file_path = None;
    let mut file_size = None;

    if truthy(&params.save_summary) {
        let now = Local::now();
        let filename = report_filename(&article.title, ReportKind::Summary, &now);
        let output_path = config.output_dir.join(filename);
        let document = render_summary_report(
            &article.title,
            &article.author,
            &article.publish_time,
            url.as_str(),
            &summary,
            &now,
        );

        // A failed write is deliberately non-fatal in the summary flow:
        // the summary itself is still returned.
        match write_report(&output_path, &document).await {
            Ok((absolute, size)) => {
                file_path = Some(absolute);
                file_size = Some(size);
            }
            Err(e) => tracing::error!("failed to save summary file: {e}"),
        }
    }

    let mut result = serde_json::json!({
        "success": true,
        "url": url.as_str(),
        "title": article.title,
        "author": article.author,
        "publish_time": article.publish_time,
        "summary": summary,
        "metadata": {
            "charset": article.charset,
            "content_type": article.content_type,
        }
    });

    if let Some(path) = file_path {
        result["file_path"] = serde_json::json!(path.to_string_lossy());
        result["file_size"] = serde_json::json!(file_size);
    }

    Ok(result)
}

/// Generate the detailed summary: at least ten sentences, third person,
/// thesis plus sub-point paragraphs.
///
/// Degrades instead of failing: short bodies get a fixed notice, and an
/// LLM failure falls back to a plain-text preview of the article.
async fn generate_detailed_summary(config: &AppConfig, article: &ArticleRecord) -> String {
    let body = article.body_text.trim();
    if body.chars().count() < MIN_SUMMARY_CHARS {
        return "文章内容过短，无法生成详细摘要。".to_string();
    }

    let prompt = summary_prompt(&article.title, body);

    let outcome = async {
        let client = ZhipuClient::new(ZhipuConfig::from_app(config)?)?;
        client.chat(&prompt, DEFAULT_MODEL, 1500, 0.3).await
    }
    .await;

    match outcome {
        Ok(summary) => summary.trim().to_string(),
        Err(e) => {
            tracing::error!("failed to generate summary: {e}");
            fallback_summary(body)
        }
    }
}

/// Plain preview of the body used when the LLM is unavailable.
fn fallback_summary(body: &str) -> String {
    match body.char_indices().nth(FALLBACK_SUMMARY_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
