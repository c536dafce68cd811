//! Upload-side ingestion into a [`DocumentStore`].
//!
//! Flow per file: validate (extension allowed, size within limit) →
//! create the [`Document`] in `processing` → extract through the registry →
//! chunk and store the chunks → mark `ready`. An extraction failure marks
//! the document `error` and is returned to the caller; the record stays in
//! the store so it can be listed and retried.

use std::path::{Path, PathBuf};

use docsift_core::chunk::chunk_text;
use docsift_core::models::{Document, DocumentStatus, Metadata};
use docsift_core::store::DocumentStore;
use docsift_core::{Error, Result};
use tracing::{info, warn};

use crate::config::{ChunkingConfig, IngestConfig};
use crate::extract::extension_of;
use crate::registry::ProcessorRegistry;

/// Outcome of [`Ingestor::ingest_many`].
#[derive(Debug, Default)]
pub struct IngestReport {
    pub ingested: Vec<Document>,
    pub chunks_written: usize,
    /// Input path and error message for each file that did not make it.
    pub failed: Vec<(PathBuf, String)>,
}

pub struct Ingestor<'a> {
    store: &'a DocumentStore,
    registry: &'a ProcessorRegistry,
    ingest: &'a IngestConfig,
    chunking: &'a ChunkingConfig,
}

impl<'a> Ingestor<'a> {
    pub fn new(
        store: &'a DocumentStore,
        registry: &'a ProcessorRegistry,
        ingest: &'a IngestConfig,
        chunking: &'a ChunkingConfig,
    ) -> Self {
        Self {
            store,
            registry,
            ingest,
            chunking,
        }
    }

    /// Check upload preconditions. Returns the normalized extension and the
    /// file size.
    pub fn validate(&self, path: &Path) -> Result<(String, u64)> {
        let ext = extension_of(path);
        if ext.is_empty() {
            return Err(Error::validation(format!(
                "{} has no file extension",
                path.display()
            )));
        }
        if !self.ingest.allowed_extensions.is_empty()
            && !self.ingest.allowed_extensions.contains(&ext)
        {
            return Err(Error::validation(format!(
                "file type .{} is not allowed",
                ext
            )));
        }
        if self.registry.processor_for(&ext).is_none() {
            return Err(Error::UnsupportedFileType(format!(".{}", ext)));
        }

        let meta = std::fs::metadata(path)?;
        if !meta.is_file() {
            return Err(Error::validation(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        if meta.len() > self.ingest.max_file_bytes {
            return Err(Error::validation(format!(
                "{} is {} bytes, limit is {}",
                path.display(),
                meta.len(),
                self.ingest.max_file_bytes
            )));
        }
        Ok((ext, meta.len()))
    }

    /// Ingest one file and return the stored document as it ends up.
    pub fn ingest(&self, path: &Path) -> Result<Document> {
        let (ext, size) = self.validate(path)?;

        let mut metadata = Metadata::new();
        metadata.insert("source_path".to_string(), path.display().to_string());
        let id = self.store.create_document(Document {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            file_type: ext,
            size,
            status: DocumentStatus::Processing,
            path: Some(path.to_path_buf()),
            metadata,
            ..Document::default()
        })?;

        let content = match self.registry.process_document(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(id = %id, path = %path.display(), error = %e, "extraction failed");
                self.store
                    .update_document_status(&id, DocumentStatus::Error)?;
                return Err(e);
            }
        };

        let chunks = chunk_text(&id, &content.text, self.chunking.max_tokens);
        let chunk_count = chunks.len();
        self.store.add_chunks(&id, chunks)?;
        self.store
            .update_document_status(&id, DocumentStatus::Ready)?;
        info!(id = %id, path = %path.display(), chunks = chunk_count, "document ingested");

        self.store.get_document(&id)
    }

    /// Ingest several files. A failure is recorded and the rest continue.
    pub fn ingest_many<P: AsRef<Path>>(&self, paths: &[P]) -> IngestReport {
        let mut report = IngestReport::default();
        for path in paths {
            let path = path.as_ref();
            match self.ingest(path) {
                Ok(doc) => {
                    report.chunks_written += doc.chunks;
                    report.ingested.push(doc);
                }
                Err(e) => report.failed.push((path.to_path_buf(), e.to_string())),
            }
        }
        report
    }
}
