//! Post-processing for raw LLM output.
//!
//! Models sometimes wrap their Markdown in a fenced code block even when
//! told not to. These rules strip that incidental wrapping without parsing
//! or validating the Markdown itself.

use std::sync::LazyLock;

use regex::Regex;

static LEADING_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^```\w*[ \t]*\n?").unwrap());
static TRAILING_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)\n?```[ \t]*$").unwrap());
static MID_OPENING_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```\w*[ \t]*\n").unwrap());
static MID_CLOSING_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n```[ \t]*\n").unwrap());

/// Strip accidental code-fence wrapping from LLM output.
///
/// Applied in order: leading fence marker (with optional language tag),
/// trailing fence marker, any fence-opening line mid-text, then collapse
/// fence-closing lines mid-text into a blank line. The result is trimmed.
pub fn strip_code_fences(raw: &str) -> String {
    let text = raw.trim();
    let text = LEADING_FENCE.replace_all(text, "");
    let text = TRAILING_FENCE.replace_all(&text, "");
    let text = MID_OPENING_FENCE.replace_all(&text, "");
    let text = MID_CLOSING_FENCE.replace_all(&text, "\n");
    text.trim().to_string()
}
