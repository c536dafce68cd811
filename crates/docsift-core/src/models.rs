//! Records held by the [`DocumentStore`](crate::store::DocumentStore) and the
//! transient extraction value produced by format processors.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// String-to-string metadata attached to documents and extraction output.
///
/// A `BTreeMap` keeps rendering (metadata tables, JSON output) stable.
pub type Metadata = BTreeMap<String, String>;

/// Processing state of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Processing,
    Ready,
    Error,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Processing => "processing",
            DocumentStatus::Ready => "ready",
            DocumentStatus::Error => "error",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "processing" => Ok(DocumentStatus::Processing),
            "ready" => Ok(DocumentStatus::Ready),
            "error" => Ok(DocumentStatus::Error),
            other => Err(format!("unknown document status: {}", other)),
        }
    }
}

/// Stored description of an uploaded file. The file bytes stay on disk at
/// `path`; only the description lives in memory.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Unique id. Left empty by callers that want the store to assign one.
    pub id: String,
    pub name: String,
    /// File extension, lower-case, without the leading dot.
    pub file_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Stamped by the store when `None`.
    pub upload_date: Option<DateTime<Utc>>,
    pub status: DocumentStatus,
    pub path: Option<PathBuf>,
    pub metadata: Metadata,
    /// Advisory chunk count.
    pub chunks: usize,
    /// Reserved for embedding support; not read anywhere yet.
    pub embeddings: bool,
}

/// A slice of a document's extracted text. References its parent by id; the
/// store drops it when the parent document is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    pub content: String,
    pub chunk_index: usize,
    /// SHA-256 of `content`, hex encoded.
    pub hash: String,
}

/// A locally available inference model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub name: String,
    pub path: Option<PathBuf>,
    pub size: u64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// A prompt sent to a model together with the response it produced.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    pub user_id: String,
    pub model_id: String,
    pub prompt: String,
    pub response: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Normalized text and metadata extracted from one file. Recomputed on every
/// extraction request; never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentContent {
    pub text: String,
    /// Extension of the source file, lower-case, no dot.
    pub file_type: String,
    pub metadata: Metadata,
    pub processed_at: DateTime<Utc>,
}

impl DocumentContent {
    pub fn new(text: impl Into<String>, file_type: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            text: text.into(),
            file_type: file_type.into(),
            metadata,
            processed_at: Utc::now(),
        }
    }
}
