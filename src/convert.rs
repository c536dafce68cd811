//! Render extracted documents as Markdown, HTML, or plain text.
//!
//! Conversion always goes through the [`ProcessorRegistry`], so any format
//! the registry can read can be converted. Rendering is split from I/O:
//! [`render_markdown`] and [`render_html`] are pure functions over a
//! [`DocumentContent`], and [`DocumentConverter`] adds reading and writing.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use docsift_core::models::DocumentContent;
use docsift_core::Result;
use serde::Serialize;
use tracing::{info, warn};

use crate::extract::body_markup;
use crate::registry::ProcessorRegistry;

/// Extensions whose body is rendered as a code block.
const STRUCTURED_TYPES: &[&str] = &[
    "json", "xml", "yaml", "yml", "toml", "csv", "tsv", "ini", "cfg", "conf", "rs", "go", "py",
    "js", "ts", "java", "c", "h", "cpp", "hpp", "sh", "sql",
];

const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Markdown,
    Html,
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Html => "html",
            OutputFormat::Text => "txt",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "html" | "htm" => Ok(OutputFormat::Html),
            "txt" | "text" | "plain" => Ok(OutputFormat::Text),
            other => Err(format!(
                "unknown output format: '{}'. Use markdown, html, or text.",
                other
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Html => "html",
            OutputFormat::Text => "text",
        })
    }
}

/// Per-input result of [`DocumentConverter::batch_convert`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "lowercase")]
pub enum ConvertOutcome {
    Converted(PathBuf),
    Failed(String),
}

impl fmt::Display for ConvertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertOutcome::Converted(path) => write!(f, "{}", path.display()),
            ConvertOutcome::Failed(msg) => write!(f, "Error: {}", msg),
        }
    }
}

pub struct DocumentConverter<'r> {
    registry: &'r ProcessorRegistry,
}

impl<'r> DocumentConverter<'r> {
    pub fn new(registry: &'r ProcessorRegistry) -> Self {
        Self { registry }
    }

    pub fn convert_to_markdown(&self, input: &Path, output: &Path) -> Result<()> {
        self.convert(input, output, OutputFormat::Markdown)
    }

    pub fn convert_to_html(&self, input: &Path, output: &Path) -> Result<()> {
        self.convert(input, output, OutputFormat::Html)
    }

    /// Writes the extracted text unchanged.
    pub fn convert_to_plain_text(&self, input: &Path, output: &Path) -> Result<()> {
        self.convert(input, output, OutputFormat::Text)
    }

    pub fn convert(&self, input: &Path, output: &Path, format: OutputFormat) -> Result<()> {
        let content = self.registry.process_document(input)?;
        let rendered = match format {
            OutputFormat::Markdown => render_markdown(&content),
            OutputFormat::Html if is_html_type(&content.file_type) => {
                // Extraction decodes entities, so pass the original markup.
                let source = std::fs::read_to_string(input)?;
                render_html_with_source(&content, &source)
            }
            OutputFormat::Html => render_html(&content),
            OutputFormat::Text => content.text,
        };
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(output, rendered)?;
        Ok(())
    }

    /// Convert each input into `output_dir` as `<stem>.<format ext>`. When
    /// two inputs share a stem, later ones keep their full file name
    /// (`notes.txt.md`), then gain a counter (`notes.txt-2.md`). Failures
    /// are recorded per input and never stop the batch.
    pub fn batch_convert<P: AsRef<Path>>(
        &self,
        inputs: &[P],
        output_dir: &Path,
        format: OutputFormat,
    ) -> HashMap<String, ConvertOutcome> {
        let mut outcomes = HashMap::new();
        if let Err(e) = std::fs::create_dir_all(output_dir) {
            for input in inputs {
                outcomes.insert(
                    input.as_ref().display().to_string(),
                    ConvertOutcome::Failed(format!(
                        "cannot create {}: {}",
                        output_dir.display(),
                        e
                    )),
                );
            }
            return outcomes;
        }

        let mut used: HashSet<PathBuf> = HashSet::new();
        for input in inputs {
            let input = input.as_ref();
            let key = input.display().to_string();
            let target = output_path(input, output_dir, format, &used);
            let outcome = match self.convert(input, &target, format) {
                Ok(()) => {
                    used.insert(target.clone());
                    ConvertOutcome::Converted(target)
                }
                Err(e) => {
                    warn!(path = %input.display(), error = %e, "conversion failed");
                    ConvertOutcome::Failed(e.to_string())
                }
            };
            outcomes.insert(key, outcome);
        }
        let converted = outcomes
            .values()
            .filter(|o| matches!(o, ConvertOutcome::Converted(_)))
            .count();
        info!(
            converted,
            failed = outcomes.len() - converted,
            format = %format,
            "batch conversion finished"
        );
        outcomes
    }
}

fn output_path(
    input: &Path,
    output_dir: &Path,
    format: OutputFormat,
    used: &HashSet<PathBuf>,
) -> PathBuf {
    let ext = format.extension();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let candidate = output_dir.join(format!("{}.{}", stem, ext));
    if !used.contains(&candidate) {
        return candidate;
    }
    let full = input
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or(stem);
    let candidate = output_dir.join(format!("{}.{}", full, ext));
    if !used.contains(&candidate) {
        return candidate;
    }
    (2..)
        .map(|n| output_dir.join(format!("{}-{}.{}", full, n, ext)))
        .find(|c| !used.contains(c))
        .unwrap_or(candidate)
}

/// Whether a document of this type is rendered as a code block.
pub fn is_structured_type(file_type: &str) -> bool {
    STRUCTURED_TYPES.contains(&file_type.to_ascii_lowercase().as_str())
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

fn document_title(content: &DocumentContent) -> String {
    content
        .metadata
        .get("title")
        .or_else(|| content.metadata.get("file_name"))
        .cloned()
        .unwrap_or_else(|| "Document".to_string())
}

/// Markdown rendering: a metadata table followed by the body. Structured
/// and source formats are fenced; everything else is emitted verbatim.
pub fn render_markdown(content: &DocumentContent) -> String {
    let mut out = format!("# {}\n\n## Metadata\n\n", document_title(content));
    out.push_str("| Key | Value |\n|-----|-------|\n");
    out.push_str(&format!("| type | {} |\n", escape_table_cell(&content.file_type)));
    for (key, value) in &content.metadata {
        out.push_str(&format!(
            "| {} | {} |\n",
            escape_table_cell(key),
            escape_table_cell(value)
        ));
    }
    out.push_str("\n## Content\n\n");
    if is_structured_type(&content.file_type) {
        let fence = if content.text.contains("```") { "~~~~" } else { "```" };
        out.push_str(&format!(
            "{}{}\n{}\n{}\n",
            fence,
            content.file_type,
            content.text.trim_end(),
            fence
        ));
    } else {
        out.push_str(&content.text);
        if !content.text.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// HTML rendering: a small standalone page with a metadata table and the
/// body. Structured formats become an escaped `<pre><code>` block and
/// anything else is split into escaped paragraphs on blank lines. Without
/// the source markup, HTML documents are rendered from their extracted text
/// like any other prose.
pub fn render_html(content: &DocumentContent) -> String {
    render_page(content, None)
}

/// [`render_html`] for an HTML document whose original markup is at hand:
/// the `<body>` of `source` is passed through unchanged.
pub fn render_html_with_source(content: &DocumentContent, source: &str) -> String {
    render_page(content, Some(source))
}

fn is_html_type(file_type: &str) -> bool {
    matches!(file_type, "html" | "htm" | "xhtml")
}

fn render_page(content: &DocumentContent, source: Option<&str>) -> String {
    let title = escape_html(&document_title(content));
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", title));
    out.push_str(
        "<style>\nbody { font-family: sans-serif; max-width: 50em; margin: 2em auto; line-height: 1.5; }\n\
         table.metadata { border-collapse: collapse; margin-bottom: 2em; }\n\
         table.metadata td, table.metadata th { border: 1px solid #ccc; padding: 0.25em 0.5em; text-align: left; }\n\
         pre { background: #f6f8fa; padding: 1em; overflow-x: auto; }\n</style>\n",
    );
    out.push_str("</head>\n<body>\n");
    out.push_str(&format!("<h1>{}</h1>\n", title));
    out.push_str("<table class=\"metadata\">\n<tr><th>Key</th><th>Value</th></tr>\n");
    out.push_str(&format!(
        "<tr><td>type</td><td>{}</td></tr>\n",
        escape_html(&content.file_type)
    ));
    for (key, value) in &content.metadata {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            escape_html(key),
            escape_html(value)
        ));
    }
    out.push_str("</table>\n<div class=\"content\">\n");

    if let Some(source) = source.filter(|_| is_html_type(&content.file_type)) {
        out.push_str(body_markup(source).trim());
        out.push('\n');
    } else if is_structured_type(&content.file_type) {
        out.push_str(&format!(
            "<pre><code class=\"language-{}\">{}</code></pre>\n",
            escape_html(&content.file_type),
            escape_html(&content.text)
        ));
    } else {
        for para in content
            .text
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            out.push_str(&format!(
                "<p>{}</p>\n",
                escape_html(para).replace('\n', "<br>\n")
            ));
        }
    }

    out.push_str("</div>\n</body>\n</html>\n");
    out
}

/// Size and reading-time figures for a body of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentSummary {
    pub words: usize,
    pub lines: usize,
    pub paragraphs: usize,
    pub reading_minutes: usize,
}

pub fn analyze(text: &str) -> ContentSummary {
    let words = text.split_whitespace().count();
    ContentSummary {
        words,
        lines: text.lines().count(),
        paragraphs: text
            .split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .count(),
        reading_minutes: words.div_ceil(WORDS_PER_MINUTE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsift_core::models::Metadata;
    use tempfile::TempDir;

    fn content(text: &str, file_type: &str) -> DocumentContent {
        let mut md = Metadata::new();
        md.insert("file_name".to_string(), format!("doc.{}", file_type));
        DocumentContent::new(text, file_type, md)
    }

    #[test]
    fn markdown_fences_structured_types() {
        let out = render_markdown(&content("{\"a\": 1}", "json"));
        assert!(out.contains("| file_name | doc.json |"));
        assert!(out.contains("```json\n{\"a\": 1}\n```\n"));
    }

    #[test]
    fn markdown_keeps_prose_verbatim() {
        let out = render_markdown(&content("Some *prose*.\n", "md"));
        assert!(out.ends_with("## Content\n\nSome *prose*.\n"));
        assert!(out.starts_with("# doc.md\n"));
    }

    #[test]
    fn html_paragraphs_are_escaped() {
        let out = render_html(&content("a < b\n\nsecond", "txt"));
        assert!(out.contains("<p>a &lt; b</p>"));
        assert!(out.contains("<p>second</p>"));
    }

    #[test]
    fn html_source_passthrough_and_code_blocks() {
        let page = content("kept", "html");
        let raw = render_html_with_source(&page, "<html><body><em>kept</em></body></html>");
        assert!(raw.contains("<div class=\"content\">\n<em>kept</em>\n</div>"));
        let code = render_html(&content("fn main() { a < b }", "rs"));
        assert!(code.contains("<pre><code class=\"language-rs\">fn main() { a &lt; b }</code></pre>"));
    }

    #[test]
    fn html_without_source_escapes_extracted_text() {
        let out = render_html(&content("Use <script>alert(1)</script> carefully", "html"));
        assert!(out.contains("<p>Use &lt;script&gt;alert(1)&lt;/script&gt; carefully</p>"));
        assert!(!out.contains("<script>"));
    }

    #[test]
    fn html_file_keeps_escaped_entities() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("page.html");
        std::fs::write(
            &input,
            "<html><head><title>Safety</title></head><body>\n<p>Use &lt;script&gt;alert(1)&lt;/script&gt; carefully</p>\n<p>Second</p>\n</body></html>",
        )
        .unwrap();
        let output = tmp.path().join("page.out.html");

        let registry = ProcessorRegistry::with_defaults();
        DocumentConverter::new(&registry)
            .convert_to_html(&input, &output)
            .unwrap();

        let html = std::fs::read_to_string(&output).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("<p>Use &lt;script&gt;alert(1)&lt;/script&gt; carefully</p>\n<p>Second</p>"));
        assert!(html.contains("<title>Safety</title>"));
    }

    #[test]
    fn format_parsing() {
        assert_eq!("Markdown".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert_eq!("htm".parse::<OutputFormat>(), Ok(OutputFormat::Html));
        assert_eq!("plain".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("docx".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn analyze_counts() {
        let summary = analyze("one two three\n\nfour\n");
        assert_eq!(summary.words, 4);
        assert_eq!(summary.lines, 3);
        assert_eq!(summary.paragraphs, 2);
        assert_eq!(summary.reading_minutes, 1);
        assert_eq!(analyze("").reading_minutes, 0);
    }

    #[test]
    fn batch_records_failures_and_avoids_collisions() {
        let tmp = TempDir::new().unwrap();
        let a_txt = tmp.path().join("notes.txt");
        let a_md = tmp.path().join("notes.md");
        let bad = tmp.path().join("image.xyz");
        std::fs::write(&a_txt, "plain notes").unwrap();
        std::fs::write(&a_md, "# Notes\n").unwrap();
        std::fs::write(&bad, "???").unwrap();
        let out_dir = tmp.path().join("out");

        let registry = ProcessorRegistry::with_defaults();
        let outcomes = DocumentConverter::new(&registry).batch_convert(
            &[&a_txt, &a_md, &bad],
            &out_dir,
            OutputFormat::Html,
        );

        assert_eq!(outcomes.len(), 3);
        assert_eq!(
            outcomes[&a_txt.display().to_string()],
            ConvertOutcome::Converted(out_dir.join("notes.html"))
        );
        assert_eq!(
            outcomes[&a_md.display().to_string()],
            ConvertOutcome::Converted(out_dir.join("notes.md.html"))
        );
        let failed = outcomes[&bad.display().to_string()].to_string();
        assert!(failed.starts_with("Error: unsupported file type"), "{}", failed);
        assert!(out_dir.join("notes.html").exists());
    }

    #[test]
    fn batch_never_reuses_an_output_path() {
        let tmp = TempDir::new().unwrap();
        let mut inputs = Vec::new();
        for (dir, body) in [("a", "first"), ("b", "second"), ("c", "third"), ("d", "fourth")] {
            let path = tmp.path().join(dir).join("notes.txt");
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, body).unwrap();
            inputs.push(path);
        }
        let out_dir = tmp.path().join("out");

        let registry = ProcessorRegistry::with_defaults();
        let outcomes =
            DocumentConverter::new(&registry).batch_convert(&inputs, &out_dir, OutputFormat::Text);

        let targets: Vec<PathBuf> = inputs
            .iter()
            .map(|p| match &outcomes[&p.display().to_string()] {
                ConvertOutcome::Converted(target) => target.clone(),
                other => panic!("unexpected outcome {:?}", other),
            })
            .collect();
        assert_eq!(
            targets,
            vec![
                out_dir.join("notes.txt"),
                out_dir.join("notes.txt.txt"),
                out_dir.join("notes.txt-2.txt"),
                out_dir.join("notes.txt-3.txt"),
            ]
        );
        for (target, body) in targets.iter().zip(["first", "second", "third", "fourth"]) {
            assert_eq!(std::fs::read_to_string(target).unwrap(), body);
        }
    }
}
