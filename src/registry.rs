//! Extension → processor dispatch.
//!
//! The registry is a plain map from normalized extension to a shared
//! [`FormatProcessor`]. Registering a processor maps every extension it
//! claims; a later registration for the same extension replaces the earlier
//! one. The registry holds no other state and is safe to share across
//! threads.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use docsift_core::models::DocumentContent;
use docsift_core::{Error, Result};
use serde::Serialize;
use tracing::debug;

use crate::extract::{
    extension_of, normalize_extension, FormatProcessor, HtmlProcessor, MarkdownProcessor,
    PlainTextProcessor, ProcessorStatus,
};

/// One row of [`ProcessorRegistry::processors`].
#[derive(Debug, Clone, Serialize)]
pub struct ProcessorInfo {
    pub extension: String,
    pub processor: &'static str,
    pub status: ProcessorStatus,
}

#[derive(Default)]
pub struct ProcessorRegistry {
    processors: HashMap<String, Arc<dyn FormatProcessor>>,
}

impl ProcessorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in processor. PDF and DOCX fall back to
    /// placeholder processors when their Cargo features are disabled.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PlainTextProcessor));
        registry.register(Arc::new(MarkdownProcessor));
        registry.register(Arc::new(HtmlProcessor));
        registry.register(pdf_processor());
        registry.register(docx_processor());
        registry
    }

    /// Map every extension `processor` supports to it, replacing any
    /// previous mapping.
    pub fn register(&mut self, processor: Arc<dyn FormatProcessor>) {
        for ext in processor.supported_types() {
            let ext = normalize_extension(ext);
            if let Some(prev) = self.processors.get(&ext) {
                debug!(
                    extension = %ext,
                    previous = prev.name(),
                    replacement = processor.name(),
                    "processor replaced"
                );
            }
            self.processors.insert(ext, Arc::clone(&processor));
        }
    }

    /// Processor for an extension, matched case-insensitively.
    pub fn processor_for(&self, extension: &str) -> Option<Arc<dyn FormatProcessor>> {
        self.processors
            .get(&normalize_extension(extension))
            .cloned()
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        self.processors.contains_key(&extension_of(path))
    }

    /// Extract `path` with the processor registered for its extension.
    ///
    /// Fails with [`Error::UnsupportedFileType`] when no processor is
    /// registered and [`Error::ExtractionFailed`] when the processor fails.
    pub fn process_document(&self, path: &Path) -> Result<DocumentContent> {
        let ext = extension_of(path);
        let processor = self
            .processors
            .get(&ext)
            .ok_or_else(|| Error::UnsupportedFileType(display_ext(&ext)))?;
        debug!(path = %path.display(), processor = processor.name(), "extracting");
        processor
            .read(path)
            .map_err(|e| Error::extraction_failed(path.display().to_string(), e))
    }

    /// Every registered extension, in no particular order.
    pub fn supported_types(&self) -> HashSet<String> {
        self.processors.keys().cloned().collect()
    }

    pub fn status(&self, extension: &str) -> Option<ProcessorStatus> {
        self.processor_for(extension).map(|p| p.status())
    }

    /// Registered extensions with their processor and status, sorted by
    /// extension.
    pub fn processors(&self) -> Vec<ProcessorInfo> {
        let mut rows: Vec<ProcessorInfo> = self
            .processors
            .iter()
            .map(|(ext, p)| ProcessorInfo {
                extension: ext.clone(),
                processor: p.name(),
                status: p.status(),
            })
            .collect();
        rows.sort_by(|a, b| a.extension.cmp(&b.extension));
        rows
    }
}

fn display_ext(ext: &str) -> String {
    if ext.is_empty() {
        "(no extension)".to_string()
    } else {
        format!(".{}", ext)
    }
}

#[cfg(feature = "pdf")]
fn pdf_processor() -> Arc<dyn FormatProcessor> {
    Arc::new(crate::extract::PdfProcessor)
}

#[cfg(not(feature = "pdf"))]
fn pdf_processor() -> Arc<dyn FormatProcessor> {
    Arc::new(crate::extract::UnavailableProcessor::new(
        "pdf",
        &["pdf"],
        "built without the `pdf` feature",
    ))
}

#[cfg(feature = "docx")]
fn docx_processor() -> Arc<dyn FormatProcessor> {
    Arc::new(crate::extract::DocxProcessor)
}

#[cfg(not(feature = "docx"))]
fn docx_processor() -> Arc<dyn FormatProcessor> {
    Arc::new(crate::extract::UnavailableProcessor::new(
        "docx",
        &["docx"],
        "built without the `docx` feature",
    ))
}
