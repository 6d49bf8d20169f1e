//! Markdown report composition and persistence.
//!
//! Reports are written under a configured base directory with deterministic,
//! collision-resistant names: a filesystem-safe slice of the article title,
//! a mode-specific suffix, and a second-resolution timestamp. After writing,
//! the file's existence is re-verified from the filesystem before the path
//! is handed back to the caller.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::llm::AnalysisMode;

/// Maximum characters of the title retained in a filename.
const FILENAME_TITLE_CHARS: usize = 50;

/// Fixed provenance disclaimer appended to summary reports.
const SUMMARY_FOOTER: &str = "**注**: 本摘要由 LLM 生成，基于语义理解和深度分析。";

/// Fixed provenance disclaimer appended to analysis reports.
const ANALYSIS_FOOTER: &str = "**注**: 本分析由 LLM 生成，基于语义理解和深度推理。如需更精确的分析，建议结合人工审核。";

/// Errors from report persistence.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("file write completed but file doesn't exist: {0}")]
    VerifyFailed(PathBuf),
}

/// Which report template and filename suffix to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Summary,
    Analysis(AnalysisMode),
}

impl ReportKind {
    /// Chinese filename suffix for this report kind.
    pub fn suffix(&self) -> String {
        match self {
            ReportKind::Summary => "摘要".to_string(),
            ReportKind::Analysis(mode) => format!("LLM{}", mode.label_cn()),
        }
    }
}

/// Reduce a title to a filesystem-safe filename stem.
///
/// Alphanumeric characters (including CJK), hyphens, underscores, and
/// spaces are kept; everything else becomes an underscore. The result is
/// truncated to 50 characters.
pub fn safe_filename_stem(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '-' | '_' | ' ') { c } else { '_' })
        .take(FILENAME_TITLE_CHARS)
        .collect()
}

/// Derive the report filename: `<stem>-<suffix>-<YYYYMMDD_HHMMSS>.md`.
pub fn report_filename(title: &str, kind: ReportKind, now: &DateTime<Local>) -> String {
    let stem = safe_filename_stem(title);
    let timestamp = now.format("%Y%m%d_%H%M%S");
    format!("{stem}-{}-{timestamp}.md", kind.suffix())
}

/// Render the Markdown document for a detailed summary.
pub fn render_summary_report(
    title: &str, author: &str, publish_time: &str, url: &str, summary: &str, now: &DateTime<Local>,
) -> String {
    format!(
        "# 文章摘要\n\n\
         **文章标题**: {title}  \n\
         **作者**: {author}  \n\
         **发布时间**: {publish_time}  \n\
         **文章链接**: {url}  \n\
         **生成时间**: {generated}\n\n\
         ---\n\n\
         ## 详细摘要\n\n\
         {summary}\n\n\
         ---\n\n\
         {SUMMARY_FOOTER}\n",
        generated = now.format("%Y-%m-%d %H:%M:%S"),
    )
}

/// Render the Markdown document for an LLM analysis.
pub fn render_analysis_report(
    title: &str, author: &str, mode: AnalysisMode, model: &str, content_chars: usize, analysis: &str,
    now: &DateTime<Local>,
) -> String {
    format!(
        "# LLM 深度分析报告（微信公众号文章）\n\n\
         **文章标题**: {title}  \n\
         **作者**: {author}  \n\
         **分析时间**: {generated}  \n\
         **分析类型**: {mode}  \n\
         **使用模型**: {model}  \n\
         **文章统计**: 总字数约 {content_chars} 字\n\n\
         ---\n\n\
         {analysis}\n\n\
         ---\n\n\
         {ANALYSIS_FOOTER}\n",
        generated = now.format("%Y-%m-%d %H:%M:%S"),
        mode = mode.as_str(),
    )
}

/// Write a report to disk and verify it landed.
///
/// The parent directory tree is created if absent. Returns the absolute
/// path and the byte size of the written file. A write that cannot be
/// re-verified from the filesystem is an error; callers decide whether
/// that is fatal.
pub async fn write_report(output_path: &Path, content: &str) -> Result<(PathBuf, u64), ReportError> {
    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    tokio::fs::write(output_path, content).await?;

    // Re-read from the filesystem rather than trusting the write call.
    let metadata = tokio::fs::metadata(output_path)
        .await
        .map_err(|_| ReportError::VerifyFailed(output_path.to_path_buf()))?;

    let absolute = tokio::fs::canonicalize(output_path)
        .await
        .unwrap_or_else(|_| output_path.to_path_buf());

    tracing::info!("report saved to: {}", absolute.display());

    Ok((absolute, metadata.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 15, 9, 30, 5).unwrap()
    }

    #[test]
    fn test_safe_filename_stem_keeps_cjk() {
        assert_eq!(safe_filename_stem("测试文章"), "测试文章");
    }

    #[test]
    fn test_safe_filename_stem_replaces_punctuation() {
        assert_eq!(safe_filename_stem("a/b:c?d"), "a_b_c_d");
        assert_eq!(safe_filename_stem("题目：副标题！"), "题目_副标题_");
    }

    #[test]
    fn test_safe_filename_stem_keeps_allowed_chars() {
        assert_eq!(safe_filename_stem("ab-cd_ef gh"), "ab-cd_ef gh");
    }

    #[test]
    fn test_safe_filename_stem_truncates_to_50() {
        let long = "标".repeat(80);
        assert_eq!(safe_filename_stem(&long).chars().count(), 50);
    }

    #[test]
    fn test_report_filename_shape() {
        let name = report_filename("测试文章", ReportKind::Summary, &fixed_now());
        assert_eq!(name, "测试文章-摘要-20240115_093005.md");
    }

    #[test]
    fn test_report_filename_analysis_suffixes() {
        let now = fixed_now();
        let comprehensive = report_filename("t", ReportKind::Analysis(AnalysisMode::Comprehensive), &now);
        assert!(comprehensive.contains("-LLM综合分析-"));
        let viewpoint = report_filename("t", ReportKind::Analysis(AnalysisMode::Viewpoint), &now);
        assert!(viewpoint.contains("-LLM观点提取-"));
        let structure = report_filename("t", ReportKind::Analysis(AnalysisMode::Structure), &now);
        assert!(structure.contains("-LLM结构分析-"));
    }

    #[test]
    fn test_report_filename_timestamp_format() {
        let name = report_filename("t", ReportKind::Summary, &fixed_now());
        let timestamp = name.rsplit('-').next().unwrap().strip_suffix(".md").unwrap();
        assert_eq!(timestamp.len(), 15);
        assert_eq!(&timestamp[8..9], "_");
        assert!(timestamp[..8].chars().all(|c| c.is_ascii_digit()));
        assert!(timestamp[9..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_summary_report_embeds_fields() {
        let doc = render_summary_report(
            "测试文章",
            "某公众号",
            "2024-01-10",
            "https://mp.weixin.qq.com/s/abc",
            "摘要正文。",
            &fixed_now(),
        );
        assert!(doc.starts_with("# 文章摘要"));
        assert!(doc.contains("**文章标题**: 测试文章"));
        assert!(doc.contains("**发布时间**: 2024-01-10"));
        assert!(doc.contains("**生成时间**: 2024-01-15 09:30:05"));
        assert!(doc.contains("摘要正文。"));
        assert!(doc.contains(SUMMARY_FOOTER));
    }

    #[test]
    fn test_analysis_report_embeds_fields() {
        let doc = render_analysis_report(
            "测试文章",
            "某公众号",
            AnalysisMode::Viewpoint,
            "glm-4",
            1234,
            "分析正文。",
            &fixed_now(),
        );
        assert!(doc.starts_with("# LLM 深度分析报告"));
        assert!(doc.contains("**分析类型**: viewpoint"));
        assert!(doc.contains("**使用模型**: glm-4"));
        assert!(doc.contains("总字数约 1234 字"));
        assert!(doc.contains(ANALYSIS_FOOTER));
    }

    #[tokio::test]
    async fn test_write_report_creates_dirs_and_verifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/sub/report.md");

        let (absolute, size) = write_report(&path, "# content\n").await.unwrap();

        assert!(absolute.is_absolute());
        assert_eq!(size, "# content\n".len() as u64);
        let on_disk = tokio::fs::read_to_string(&absolute).await.unwrap();
        assert_eq!(on_disk, "# content\n");
    }
}
