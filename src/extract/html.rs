//! HTML processor.
//!
//! Structure metadata (`title`, `link_count`, `image_count`,
//! `header_count`) is counted on the raw markup before anything is
//! stripped. The body is then reduced to plain text: comments, `<script>`
//! and `<style>` blocks are dropped, block-level tags become line breaks,
//! remaining tags are removed, common entities are decoded, and runs of
//! blank lines collapse to one.

use std::path::Path;
use std::sync::LazyLock;

use docsift_core::models::{DocumentContent, Metadata};
use regex::Regex;

use super::{base_metadata, extension_of, read_utf8, ExtractError, FormatProcessor};

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<a[\s>]").expect("valid regex"));
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img[\s/>]").expect("valid regex"));
static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h[1-6][\s>]").expect("valid regex"));
static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static SCRIPT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script[^>]*>.*?</script>|<style[^>]*>.*?</style>|<head[^>]*>.*?</head>")
        .expect("valid regex")
});
static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</?(p|div|br|li|tr|h[1-6]|ul|ol|table|section|article|header|footer|blockquote|pre|title)(\s[^>]*)?/?>",
    )
    .expect("valid regex")
});
static BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body[^>]*>(.*)</body>").expect("valid regex"));
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

pub struct HtmlProcessor;

impl FormatProcessor for HtmlProcessor {
    fn name(&self) -> &'static str {
        "html"
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["html", "htm", "xhtml"]
    }

    fn read(&self, path: &Path) -> Result<DocumentContent, ExtractError> {
        let (raw, size) = read_utf8(path)?;
        let structure = structure_metadata(&raw);
        let text = html_to_text(&raw);
        let mut metadata = base_metadata(path, size, &text);
        metadata.extend(structure);
        Ok(DocumentContent::new(text, extension_of(path), metadata))
    }
}

fn structure_metadata(raw: &str) -> Metadata {
    let mut md = Metadata::new();
    if let Some(caps) = TITLE.captures(raw) {
        let title = decode_entities(ANY_TAG.replace_all(&caps[1], "").trim());
        if !title.is_empty() {
            md.insert("title".to_string(), title);
        }
    }
    md.insert("link_count".to_string(), LINK.find_iter(raw).count().to_string());
    md.insert(
        "image_count".to_string(),
        IMAGE.find_iter(raw).count().to_string(),
    );
    md.insert(
        "header_count".to_string(),
        HEADER.find_iter(raw).count().to_string(),
    );
    md
}

/// Inner markup of the `<body>` element, or the whole input when there is
/// none (fragments).
pub fn body_markup(raw: &str) -> &str {
    BODY.captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or(raw, |m| m.as_str())
}

/// Strip markup from an HTML document, keeping paragraph structure.
pub fn html_to_text(raw: &str) -> String {
    let without_comments = COMMENT.replace_all(raw, "");
    let without_scripts = SCRIPT_STYLE.replace_all(&without_comments, "");
    let with_breaks = BLOCK_TAG.replace_all(&without_scripts, "\n");
    let stripped = ANY_TAG.replace_all(&with_breaks, "");
    let decoded = decode_entities(&stripped);

    let mut out = String::new();
    let mut blank_run = true;
    for line in decoded.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            if !blank_run {
                out.push('\n');
            }
            blank_run = true;
            continue;
        }
        out.push_str(&line);
        out.push('\n');
        blank_run = false;
    }
    out.trim_end().to_string()
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
