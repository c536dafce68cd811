//! Error taxonomy shared by the store, the registry, and the search and
//! conversion layers.

use thiserror::Error;

/// Errors surfaced by docsift operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown document, chunk, model, user, or prompt id.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// No processor is registered for the extension.
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// A processor could not read or parse the underlying bytes.
    #[error("extraction failed for {path}: {source}")]
    ExtractionFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Upload precondition violated (extension not allowed, file too large).
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// The search query could not be compiled as a regular expression.
    #[error("invalid search pattern: {0}")]
    InvalidPattern(String),

    /// The store was closed and no longer accepts operations.
    #[error("store closed")]
    StoreClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn extraction_failed(
        path: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ExtractionFailed {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
