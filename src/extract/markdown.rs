//! Markdown processor.
//!
//! The body is kept as raw Markdown source so line numbers in search results
//! point at the file as written. Structure is counted with a pulldown-cmark
//! event walk: headings, links, images, and fenced or indented code blocks.
//! The first heading becomes the `title`.

use std::path::Path;

use docsift_core::models::{DocumentContent, Metadata};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use super::{base_metadata, extension_of, read_utf8, ExtractError, FormatProcessor};

pub struct MarkdownProcessor;

impl FormatProcessor for MarkdownProcessor {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["md", "markdown"]
    }

    fn read(&self, path: &Path) -> Result<DocumentContent, ExtractError> {
        let (text, size) = read_utf8(path)?;
        let mut metadata = base_metadata(path, size, &text);
        metadata.extend(structure_metadata(&text));
        Ok(DocumentContent::new(text, extension_of(path), metadata))
    }
}

fn structure_metadata(source: &str) -> Metadata {
    let mut headers = 0usize;
    let mut links = 0usize;
    let mut images = 0usize;
    let mut code_blocks = 0usize;
    let mut title: Option<String> = None;
    let mut heading_buf: Option<String> = None;

    for event in Parser::new(source) {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                headers += 1;
                if title.is_none() {
                    heading_buf = Some(String::new());
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(buf) = heading_buf.take() {
                    let trimmed = buf.trim();
                    if !trimmed.is_empty() {
                        title = Some(trimmed.to_string());
                    }
                }
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some(buf) = heading_buf.as_mut() {
                    buf.push_str(&t);
                }
            }
            Event::Start(Tag::Link { .. }) => links += 1,
            Event::Start(Tag::Image { .. }) => images += 1,
            Event::Start(Tag::CodeBlock(_)) => code_blocks += 1,
            _ => {}
        }
    }

    let mut md = Metadata::new();
    if let Some(t) = title {
        md.insert("title".to_string(), t);
    }
    md.insert("header_count".to_string(), headers.to_string());
    md.insert("link_count".to_string(), links.to_string());
    md.insert("image_count".to_string(), images.to_string());
    md.insert("code_block_count".to_string(), code_blocks.to_string());
    md
}
