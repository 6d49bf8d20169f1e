//! Client code for the WeChat article MCP server.
//!
//! This crate provides URL validation, the HTTP fetch pipeline, markup
//! extraction, the LLM chat-completion client, and report composition
//! shared by the server tools.

pub mod extract;
pub mod fetch;
pub mod llm;
pub mod report;

pub use extract::{ArticleRecord, extract_article, normalize_text};
pub use fetch::{FetchClient, FetchConfig, FetchError, FetchResponse, UrlError, validate_wechat_url};
pub use llm::{
    AnalysisMode, DEFAULT_MODEL, LlmError, ZhipuClient, ZhipuConfig, analysis_prompt, strip_code_fences,
    summary_prompt,
};
pub use report::{
    ReportError, ReportKind, render_analysis_report, render_summary_report, report_filename, safe_filename_stem,
    write_report,
};
