//! Stand-in for a processor whose extraction backend is not compiled in.
//!
//! Reading never fails: callers that only list or preview documents get a
//! placeholder body and `status = placeholder` in the metadata, while
//! [`ProcessorStatus::Unavailable`] lets them tell a missing extractor apart
//! from a document that simply has no text.

use std::path::Path;

use docsift_core::models::{DocumentContent, Metadata};

use super::{extension_of, ExtractError, FormatProcessor, ProcessorStatus};

pub struct UnavailableProcessor {
    name: &'static str,
    types: &'static [&'static str],
    reason: &'static str,
}

impl UnavailableProcessor {
    pub const fn new(
        name: &'static str,
        types: &'static [&'static str],
        reason: &'static str,
    ) -> Self {
        Self {
            name,
            types,
            reason,
        }
    }
}

impl FormatProcessor for UnavailableProcessor {
    fn name(&self) -> &'static str {
        self.name
    }

    fn supported_types(&self) -> &'static [&'static str] {
        self.types
    }

    fn status(&self) -> ProcessorStatus {
        ProcessorStatus::Unavailable {
            reason: self.reason.to_string(),
        }
    }

    fn read(&self, path: &Path) -> Result<DocumentContent, ExtractError> {
        let mut metadata = Metadata::new();
        metadata.insert("status".to_string(), "placeholder".to_string());
        metadata.insert("reason".to_string(), self.reason.to_string());
        if let Some(name) = path.file_name() {
            metadata.insert("file_name".to_string(), name.to_string_lossy().to_string());
        }
        if let Ok(meta) = std::fs::metadata(path) {
            metadata.insert("file_size".to_string(), meta.len().to_string());
        }
        let text = format!(
            "[{} text extraction not implemented: {}]",
            self.name, self.reason
        );
        Ok(DocumentContent::new(text, extension_of(path), metadata))
    }
}
