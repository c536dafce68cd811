use std::path::Path;

use docsift_core::models::DocumentContent;

use super::{base_metadata, extension_of, ExtractError, FormatProcessor};

/// PDF text extraction through `pdf-extract`.
pub struct PdfProcessor;

impl FormatProcessor for PdfProcessor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["pdf"]
    }

    fn read(&self, path: &Path) -> Result<DocumentContent, ExtractError> {
        let bytes = std::fs::read(path)?;
        let text = pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| ExtractError::Pdf(e.to_string()))?;
        let text = text.trim().to_string();
        let mut metadata = base_metadata(path, bytes.len() as u64, &text);
        metadata.insert("extractor".to_string(), "pdf-extract".to_string());
        Ok(DocumentContent::new(text, extension_of(path), metadata))
    }
}
