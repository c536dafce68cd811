use std::path::Path;

use docsift_core::models::DocumentContent;

use super::{base_metadata, extension_of, read_utf8, ExtractError, FormatProcessor};

/// Plain text and text-based structured or source formats. The text is
/// returned exactly as stored on disk.
pub struct PlainTextProcessor;

const TYPES: &[&str] = &[
    "txt", "text", "log", "csv", "tsv", "json", "xml", "yaml", "yml", "toml", "ini", "cfg",
    "conf", "rs", "go", "py", "js", "ts", "java", "c", "h", "cpp", "hpp", "sh", "sql",
];

impl FormatProcessor for PlainTextProcessor {
    fn name(&self) -> &'static str {
        "text"
    }

    fn supported_types(&self) -> &'static [&'static str] {
        TYPES
    }

    fn read(&self, path: &Path) -> Result<DocumentContent, ExtractError> {
        let (text, size) = read_utf8(path)?;
        let metadata = base_metadata(path, size, &text);
        Ok(DocumentContent::new(text, extension_of(path), metadata))
    }
}
