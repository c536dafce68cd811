//! Format processors: turn one file format into normalized text plus
//! metadata.
//!
//! Every processor implements [`FormatProcessor`]. Which extensions a
//! processor claims is reported by [`FormatProcessor::supported_types`];
//! the [`ProcessorRegistry`](crate::registry::ProcessorRegistry) maps those
//! extensions back to the processor.
//!
//! PDF and DOCX extraction sit behind the `pdf` and `docx` Cargo features.
//! When a feature is off, an [`UnavailableProcessor`] stands in for it so
//! listing and previewing keep working; its output is a placeholder and its
//! [`ProcessorStatus`] says why.

mod html;
mod markdown;
mod text;
mod unavailable;

#[cfg(feature = "docx")]
mod docx;
#[cfg(feature = "pdf")]
mod pdf;

use std::path::Path;

use docsift_core::models::{DocumentContent, Metadata};
use serde::Serialize;
use thiserror::Error;

#[cfg(feature = "docx")]
pub use docx::DocxProcessor;
pub use html::{body_markup, HtmlProcessor};
pub use markdown::MarkdownProcessor;
#[cfg(feature = "pdf")]
pub use pdf::PdfProcessor;
pub use text::PlainTextProcessor;
pub use unavailable::UnavailableProcessor;

/// Whether a processor can actually extract text in this build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ProcessorStatus {
    Available,
    Unavailable { reason: String },
}

impl ProcessorStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, ProcessorStatus::Available)
    }
}

impl std::fmt::Display for ProcessorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessorStatus::Available => f.write_str("available"),
            ProcessorStatus::Unavailable { reason } => write!(f, "unavailable ({})", reason),
        }
    }
}

/// Failure inside a single processor. The registry wraps it into
/// [`docsift_core::Error::ExtractionFailed`].
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("file is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("OOXML extraction failed: {0}")]
    Ooxml(String),
}

/// Reads one file format into a [`DocumentContent`].
pub trait FormatProcessor: Send + Sync {
    /// Short human-readable name, e.g. `"markdown"`.
    fn name(&self) -> &'static str;

    /// Lower-case extensions without the leading dot.
    fn supported_types(&self) -> &'static [&'static str];

    fn status(&self) -> ProcessorStatus {
        ProcessorStatus::Available
    }

    fn read(&self, path: &Path) -> Result<DocumentContent, ExtractError>;
}

/// Lower-case an extension and drop any leading dot.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Normalized extension of `path`, empty when it has none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| normalize_extension(&e.to_string_lossy()))
        .unwrap_or_default()
}

pub(crate) fn read_utf8(path: &Path) -> Result<(String, u64), ExtractError> {
    let bytes = std::fs::read(path)?;
    let size = bytes.len() as u64;
    Ok((String::from_utf8(bytes)?, size))
}

/// Metadata every processor reports: file name and size plus basic counts
/// over the extracted text.
pub(crate) fn base_metadata(path: &Path, file_size: u64, text: &str) -> Metadata {
    let mut md = Metadata::new();
    md.insert(
        "file_name".to_string(),
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
    );
    md.insert("file_size".to_string(), file_size.to_string());
    md.insert("line_count".to_string(), text.lines().count().to_string());
    md.insert(
        "word_count".to_string(),
        text.split_whitespace().count().to_string(),
    );
    md.insert("char_count".to_string(), text.chars().count().to_string());
    md
}
