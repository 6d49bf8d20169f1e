//! Prompt construction for article summarization and analysis.
//!
//! Three mutually exclusive analysis templates plus a fixed summarization
//! template. All templates truncate the source body to a fixed character
//! budget before embedding it; truncation is a hard cut at a character
//! boundary, never paragraph-aware.

/// Character budget for article text embedded in analysis prompts.
const ANALYSIS_BODY_BUDGET: usize = 6000;

/// Character budget for article text embedded in the summary prompt.
const SUMMARY_BODY_BUDGET: usize = 4000;

/// The shape of analysis requested from the LLM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    /// Five-section deep analysis (default).
    #[default]
    Comprehensive,
    /// Thesis and supporting-point extraction with value rating.
    Viewpoint,
    /// Structure, transitions, hierarchy, and readability.
    Structure,
}

impl AnalysisMode {
    /// Parse a mode label; unrecognized labels fall back to comprehensive.
    pub fn parse(label: &str) -> Self {
        match label {
            "viewpoint" => AnalysisMode::Viewpoint,
            "structure" => AnalysisMode::Structure,
            _ => AnalysisMode::Comprehensive,
        }
    }

    /// Stable machine-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Comprehensive => "comprehensive",
            AnalysisMode::Viewpoint => "viewpoint",
            AnalysisMode::Structure => "structure",
        }
    }

    /// Chinese label used in report filenames and headings.
    pub fn label_cn(&self) -> &'static str {
        match self {
            AnalysisMode::Comprehensive => "综合分析",
            AnalysisMode::Viewpoint => "观点提取",
            AnalysisMode::Structure => "结构分析",
        }
    }
}

/// Hard cut to at most `max_chars` characters, at a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Build the mode-specific analysis instruction for the LLM.
pub fn analysis_prompt(mode: AnalysisMode, title: &str, author: &str, body: &str) -> String {
    let body = truncate_chars(body, ANALYSIS_BODY_BUDGET);

    match mode {
        AnalysisMode::Viewpoint => format!(
            "请对以下微信公众号文章进行观点提取和分析：\n\n\
             **文章标题**: {title}\n\
             **作者**: {author}\n\
             **文章内容**:\n{body}\n\n\
             请完成以下分析：\n\n\
             1. **核心观点识别**：提取文章的核心观点（1-2句话）\n\
             2. **分论点链条**：识别文章的主要分论点（3-5个），并说明它们如何支撑核心观点\n\
             3. **论证方式**：分析文章使用了哪些论证方式（案例、数据、引用、故事等）\n\
             4. **观点价值评估**：评估核心观点和分论点的价值（1-5分，说明理由）\n\
             5. **逻辑结构**：分析文章的逻辑结构是否清晰，是否存在逻辑跳跃\n\n\
             请以 Markdown 格式输出，包含表格和结构化内容。"
        ),
        AnalysisMode::Structure => format!(
            "请对以下微信公众号文章进行结构分析：\n\n\
             **文章标题**: {title}\n\
             **作者**: {author}\n\
             **文章内容**:\n{body}\n\n\
             请完成以下分析：\n\n\
             1. **文章结构**：分析文章的整体结构（开头、主体、结尾）\n\
             2. **段落组织**：分析段落之间的逻辑关系\n\
             3. **过渡衔接**：评估段落之间的过渡是否自然\n\
             4. **层次划分**：识别文章的信息层次（标题、小标题、段落等）\n\
             5. **可读性**：评估文章的可读性，给出改进建议\n\n\
             请以 Markdown 格式输出。"
        ),
        AnalysisMode::Comprehensive => format!(
            "请对以下微信公众号文章进行深度综合分析：\n\n\
             **文章标题**: {title}\n\
             **作者**: {author}\n\
             **文章内容**:\n{body}\n\n\
             请完成以下综合分析：\n\n\
             ## 1. 核心观点提取\n\
             - 核心观点（1-2句话）\n\
             - 分论点链条（3-5个主要分论点）\n\
             - 观点之间的逻辑关系\n\n\
             ## 2. 结构分析\n\
             - 文章整体结构（开头、主体、结尾）\n\
             - 段落组织与逻辑关系\n\
             - 过渡衔接是否自然\n\n\
             ## 3. 论证方式分析\n\
             - 使用的论证方式（案例、数据、引用、故事、对比等）\n\
             - 每种论证方式的效果评估\n\n\
             ## 4. 语言风格分析\n\
             - 语言特点（简洁/冗长、生动/平淡、专业/通俗等）\n\
             - 表达技巧（修辞手法、金句等）\n\
             - 可读性评估\n\n\
             ## 5. 价值与影响评估\n\
             - 观点价值（创新性、实用性、传播价值）\n\
             - 目标读者群体\n\
             - 可能的传播效果\n\n\
             请以 Markdown 格式输出，使用表格和结构化内容，确保分析深入、具体、可操作。不要包含优化建议部分。\n\n\
             **重要**：直接输出 Markdown 内容，不要使用代码块（```）包裹。表格应该直接使用 Markdown 表格语法。"
        ),
    }
}

/// Build the fixed detailed-summary instruction: core thesis heading with a
/// 1-2 sentence synthesis, then one third-person paragraph per sub-point,
/// at least ten sentences total.
pub fn summary_prompt(title: &str, body: &str) -> String {
    let title = if title.is_empty() { "未提供" } else { title };
    let body = truncate_chars(body, SUMMARY_BODY_BUDGET);

    format!(
        "请为以下文章生成详细摘要，要求：\n\n\
         **输出结构：**\n\
         1. 使用\"**总论点**：\"作为标题，然后用1-2句话总结文章的核心观点\n\
         2. 使用\"**分论点**：\"作为标题，然后按照文章的自然结构，逐一阐述各个分论点\n\
         3. 每个分论点用独立的自然段落表达，不使用列表符号（如 -、•、1. 2. 3. 等）\n\n\
         **必须做到：**\n\
         - 至少十句话，全面总结文章核心内容\n\
         - 清晰呈现总论点：用1-2句话明确表达文章的核心观点\n\
         - 按文章结构阐述分论点：根据文章的自然结构和逻辑顺序，用流畅的段落文字逐一阐述各个分论点\n\
         - 使用第三人称客观描述：使用\"文章\"、\"作者\"等第三人称，保持人称一致，绝对不要使用\"你\"、\"他\"等，完全用第三人称客观转述\n\
         - 使用自然语言：每个分论点用独立的段落表达，不使用列表符号或编号，保持逻辑清晰、语言自然\n\n\
         **输出格式示例：**\n\
         **总论点**：\n\
         文章的核心观点是[用1-2句话表达核心观点]。\n\n\
         **分论点**：\n\n\
         [分论点1的段落文字，用第三人称客观描述（如\"文章认为\"、\"作者指出\"等），自然流畅的语言表达]\n\n\
         [分论点2的段落文字，用第三人称客观描述，自然流畅的语言表达]\n\n\
         [分论点3的段落文字，用第三人称客观描述，自然流畅的语言表达]\n\n\
         ...\n\n\
         **注意：**\n\
         - 不要使用任何列表符号（-、•、1. 2. 3. 等）\n\
         - 必须使用\"**总论点**：\"和\"**分论点**：\"作为分段标题\n\
         - 每个分论点用独立的自然段落表达，段落之间空一行\n\
         - 使用第三人称客观描述，保持人称一致，完全用第三人称客观转述\n\
         - 完全使用自然段落文字，客观准确地呈现内容\n\n\
         文章标题：{title}\n\n\
         文章正文：\n{body}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!(AnalysisMode::parse("viewpoint"), AnalysisMode::Viewpoint);
        assert_eq!(AnalysisMode::parse("structure"), AnalysisMode::Structure);
        assert_eq!(AnalysisMode::parse("comprehensive"), AnalysisMode::Comprehensive);
        assert_eq!(AnalysisMode::parse("anything-else"), AnalysisMode::Comprehensive);
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(AnalysisMode::Viewpoint.as_str(), "viewpoint");
        assert_eq!(AnalysisMode::Viewpoint.label_cn(), "观点提取");
        assert_eq!(AnalysisMode::Comprehensive.label_cn(), "综合分析");
        assert_eq!(AnalysisMode::Structure.label_cn(), "结构分析");
    }

    #[test]
    fn test_truncate_chars_boundary() {
        let text = "汉字文本内容";
        assert_eq!(truncate_chars(text, 3), "汉字文");
        assert_eq!(truncate_chars(text, 100), text);
        assert_eq!(truncate_chars("", 10), "");
    }

    #[test]
    fn test_analysis_prompts_are_mode_specific() {
        let viewpoint = analysis_prompt(AnalysisMode::Viewpoint, "标题", "作者", "正文");
        assert!(viewpoint.contains("观点提取和分析"));
        assert!(viewpoint.contains("核心观点识别"));

        let structure = analysis_prompt(AnalysisMode::Structure, "标题", "作者", "正文");
        assert!(structure.contains("结构分析"));
        assert!(structure.contains("过渡衔接"));

        let comprehensive = analysis_prompt(AnalysisMode::Comprehensive, "标题", "作者", "正文");
        assert!(comprehensive.contains("深度综合分析"));
        assert!(comprehensive.contains("不要使用代码块"));
    }

    #[test]
    fn test_analysis_prompt_embeds_metadata() {
        let prompt = analysis_prompt(AnalysisMode::Comprehensive, "我的标题", "某作者", "正文内容");
        assert!(prompt.contains("我的标题"));
        assert!(prompt.contains("某作者"));
        assert!(prompt.contains("正文内容"));
    }

    #[test]
    fn test_analysis_prompt_truncates_body() {
        let body = "字".repeat(7000);
        let prompt = analysis_prompt(AnalysisMode::Comprehensive, "t", "a", &body);
        let embedded: usize = prompt.matches('字').count();
        assert_eq!(embedded, 6000);
    }

    #[test]
    fn test_summary_prompt_truncates_body() {
        let body = "字".repeat(5000);
        let prompt = summary_prompt("t", &body);
        assert_eq!(prompt.matches('字').count(), 4000);
    }

    #[test]
    fn test_summary_prompt_structure() {
        let prompt = summary_prompt("标题", "正文");
        assert!(prompt.contains("**总论点**"));
        assert!(prompt.contains("**分论点**"));
        assert!(prompt.contains("至少十句话"));
        assert!(prompt.contains("第三人称"));
    }

    #[test]
    fn test_summary_prompt_default_title() {
        let prompt = summary_prompt("", "正文");
        assert!(prompt.contains("文章标题：未提供"));
    }
}
