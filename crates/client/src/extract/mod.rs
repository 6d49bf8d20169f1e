//! Structured field extraction from WeChat article markup.
//!
//! WeChat serves several page variants whose markup differs, so every field
//! is resolved through an ordered fallback chain of CSS selectors: the first
//! rule that matches a node wins, and a chain that matches nothing yields an
//! empty string rather than a failure. Body text is reduced to plain prose
//! with script/style subtrees removed and whitespace normalized.

use scraper::{Html, Node, Selector};

/// Preview length (in characters) when full body content is not required.
const PREVIEW_CHARS: usize = 200;

/// The result of extracting one article page. Created once per fetch and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    /// Validated source URL.
    pub url: String,
    /// Article title (possibly empty).
    pub title: String,
    /// Author or account nickname (possibly empty).
    pub author: String,
    /// Raw, unparsed publish time string.
    pub publish_time: String,
    /// Meta description (og:description preferred).
    pub description: String,
    /// Plain-text body, whitespace-normalized. Truncated to a preview when
    /// full content was not requested.
    pub body_text: String,
    /// Response charset, for downstream diagnostics.
    pub charset: String,
    /// Response Content-Type header, for downstream diagnostics.
    pub content_type: String,
}

/// Title fallback chain: primary title heading, then the alternate
/// activity-name id used by older page variants.
const TITLE_RULES: &[&str] = &["h1.rich_media_title", "h1#activity-name"];

/// Author fallback chain: rich-media nickname link, profile nickname,
/// alternate name id.
const AUTHOR_RULES: &[&str] = &[
    "a.rich_media_meta.rich_media_meta_link.rich_media_meta_nickname",
    "strong.profile_nickname",
    "a#js_name",
];

/// Publish-time fallback chain.
const PUBLISH_TIME_RULES: &[&str] = &[
    "em.rich_media_meta.rich_media_meta_text",
    "span.rich_media_meta.rich_media_meta_text",
    "em#publish_time",
];

/// Body container fallback chain.
const BODY_RULES: &[&str] = &["div.rich_media_content", "div#js_content"];

/// Description fallback chain; these are meta tags read via their
/// `content` attribute rather than visible text.
const DESCRIPTION_RULES: &[&str] = &["meta[property=\"og:description\"]", "meta[name=\"description\"]"];

/// Extract structured fields from fetched article markup.
///
/// Optional fields that no rule matches come back empty; extraction itself
/// never fails on missing fields. When `include_content` is false only the
/// first 200 characters of the body are retained (with an ellipsis marker
/// if truncated) to keep metadata-only payloads small.
pub fn extract_article(
    url: &str, html: &str, charset: &str, content_type: &str, include_content: bool,
) -> ArticleRecord {
    let document = Html::parse_document(html);

    let title = first_text(&document, TITLE_RULES);
    let author = first_text(&document, AUTHOR_RULES);
    let publish_time = first_text(&document, PUBLISH_TIME_RULES);
    let description = first_attr(&document, DESCRIPTION_RULES, "content");

    let full_body = body_text(&document);
    let body_text = if include_content { full_body } else { preview(&full_body) };

    ArticleRecord {
        url: url.to_string(),
        title,
        author,
        publish_time,
        description,
        body_text,
        charset: charset.to_string(),
        content_type: content_type.to_string(),
    }
}

/// First matching rule wins; trimmed visible text of the matched node.
fn first_text(document: &Html, rules: &[&str]) -> String {
    for rule in rules {
        let Ok(selector) = Selector::parse(rule) else { continue };
        if let Some(element) = document.select(&selector).next() {
            let text: String = element.text().collect();
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    String::new()
}

/// First matching rule wins; value of the named attribute.
fn first_attr(document: &Html, rules: &[&str], attr: &str) -> String {
    for rule in rules {
        let Ok(selector) = Selector::parse(rule) else { continue };
        if let Some(element) = document.select(&selector).next()
            && let Some(value) = element.value().attr(attr)
        {
            return value.to_string();
        }
    }
    String::new()
}

/// Extract normalized plain text from the article body container.
fn body_text(document: &Html) -> String {
    for rule in BODY_RULES {
        let Ok(selector) = Selector::parse(rule) else { continue };
        if let Some(element) = document.select(&selector).next() {
            let mut raw = String::new();
            collect_text(*element, &mut raw);
            return normalize_text(&raw);
        }
    }
    String::new()
}

/// Collect text nodes below `node`, skipping script and style subtrees
/// entirely so their payloads never leak into the body text.
fn collect_text(node: ego_tree::NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                if !matches!(element.name(), "script" | "style") {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}

/// Normalize raw extracted text to plain prose.
///
/// Lines are trimmed, split on internal double-space runs to approximate
/// phrase boundaries, and non-empty fragments are rejoined with single
/// newlines. Idempotent: normalizing normalized text is a no-op.
pub fn normalize_text(raw: &str) -> String {
    raw.lines()
        .flat_map(|line| line.trim().split("  "))
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// First 200 characters of the body, with an ellipsis marker if truncated.
fn preview(body: &str) -> String {
    let mut chars = body.char_indices();
    match chars.nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
