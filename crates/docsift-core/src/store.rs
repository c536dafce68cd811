//! In-memory repository for documents, chunks, models, users, and prompts.
//!
//! All records live in `HashMap`s behind a single `std::sync::RwLock`. Reads
//! take the shared lock and may run concurrently; every mutation takes the
//! exclusive lock, so writes are serialized and multi-map updates (deleting a
//! document together with its chunks) are observed atomically.
//!
//! Every read hands back an owned clone. Callers can mutate what they get
//! without touching the stored record.
//!
//! Ids left empty by the caller are drawn from per-kind monotonically
//! increasing counters. A caller-supplied document id that already exists
//! overwrites the previous record and discards its chunks.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Chunk, Document, DocumentStatus, Model, Prompt, User};

#[derive(Default)]
struct Inner {
    documents: HashMap<String, Document>,
    chunks: HashMap<String, Vec<Chunk>>,
    models: HashMap<String, Model>,
    users: HashMap<String, User>,
    prompts: HashMap<String, Prompt>,
    next_document_id: u64,
    next_model_id: u64,
    next_user_id: u64,
    next_prompt_id: u64,
    closed: bool,
}

/// Concurrent in-memory store. Construct one at startup and share it by
/// reference (or `Arc`) with every consumer.
pub struct DocumentStore {
    inner: RwLock<Inner>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    // Poisoning is ignored; the maps hold plain data.
    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        if guard.closed {
            return Err(Error::StoreClosed);
        }
        Ok(guard)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        let guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if guard.closed {
            return Err(Error::StoreClosed);
        }
        Ok(guard)
    }

    // ---- documents ----

    /// Insert a document, assigning an id and upload date when absent.
    ///
    /// Returns the id the document is stored under.
    pub fn create_document(&self, mut doc: Document) -> Result<String> {
        let mut inner = self.write()?;
        if doc.id.is_empty() {
            let Inner {
                documents,
                next_document_id,
                ..
            } = &mut *inner;
            doc.id = next_id(next_document_id, |id| documents.contains_key(id));
        } else if inner.documents.contains_key(&doc.id) {
            debug!(id = %doc.id, "overwriting existing document");
            inner.chunks.remove(&doc.id);
        }
        if doc.upload_date.is_none() {
            doc.upload_date = Some(Utc::now());
        }
        let id = doc.id.clone();
        inner.documents.insert(id.clone(), doc);
        Ok(id)
    }

    pub fn get_document(&self, id: &str) -> Result<Document> {
        self.read()?
            .documents
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found("document", id))
    }

    /// All documents, in no particular order.
    pub fn list_documents(&self) -> Result<Vec<Document>> {
        Ok(self.read()?.documents.values().cloned().collect())
    }

    pub fn document_count(&self) -> Result<usize> {
        Ok(self.read()?.documents.len())
    }

    pub fn update_document_status(&self, id: &str, status: DocumentStatus) -> Result<()> {
        let mut inner = self.write()?;
        let doc = inner
            .documents
            .get_mut(id)
            .ok_or_else(|| Error::not_found("document", id))?;
        doc.status = status;
        Ok(())
    }

    /// Remove a document and every chunk that belongs to it.
    pub fn delete_document(&self, id: &str) -> Result<()> {
        let mut inner = self.write()?;
        if inner.documents.remove(id).is_none() {
            return Err(Error::not_found("document", id));
        }
        inner.chunks.remove(id);
        Ok(())
    }

    // ---- chunks ----

    /// Append chunks to an existing document and refresh its chunk count.
    pub fn add_chunks(&self, document_id: &str, chunks: Vec<Chunk>) -> Result<()> {
        let mut inner = self.write()?;
        if !inner.documents.contains_key(document_id) {
            return Err(Error::not_found("document", document_id));
        }
        let stored = inner.chunks.entry(document_id.to_string()).or_default();
        stored.extend(chunks.into_iter().map(|mut c| {
            c.document_id = document_id.to_string();
            c
        }));
        let count = stored.len();
        if let Some(doc) = inner.documents.get_mut(document_id) {
            doc.chunks = count;
        }
        Ok(())
    }

    /// Chunks of a document ordered by `chunk_index`. Empty for unknown ids.
    pub fn get_chunks(&self, document_id: &str) -> Result<Vec<Chunk>> {
        let mut chunks = self
            .read()?
            .chunks
            .get(document_id)
            .cloned()
            .unwrap_or_default();
        chunks.sort_by_key(|c| c.chunk_index);
        Ok(chunks)
    }

    // ---- models ----

    pub fn create_model(&self, mut model: Model) -> Result<String> {
        let mut inner = self.write()?;
        if model.id.is_empty() {
            let Inner {
                models,
                next_model_id,
                ..
            } = &mut *inner;
            model.id = next_id(next_model_id, |id| models.contains_key(id));
        }
        if model.created_at.is_none() {
            model.created_at = Some(Utc::now());
        }
        let id = model.id.clone();
        inner.models.insert(id.clone(), model);
        Ok(id)
    }

    pub fn get_model(&self, id: &str) -> Result<Model> {
        self.read()?
            .models
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found("model", id))
    }

    pub fn list_models(&self) -> Result<Vec<Model>> {
        Ok(self.read()?.models.values().cloned().collect())
    }

    pub fn delete_model(&self, id: &str) -> Result<()> {
        self.write()?
            .models
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("model", id))
    }

    // ---- users ----

    pub fn create_user(&self, mut user: User) -> Result<String> {
        let mut inner = self.write()?;
        if user.id.is_empty() {
            let Inner {
                users,
                next_user_id,
                ..
            } = &mut *inner;
            user.id = next_id(next_user_id, |id| users.contains_key(id));
        }
        if user.created_at.is_none() {
            user.created_at = Some(Utc::now());
        }
        let id = user.id.clone();
        inner.users.insert(id.clone(), user);
        Ok(id)
    }

    pub fn get_user(&self, id: &str) -> Result<User> {
        self.read()?
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found("user", id))
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.read()?.users.values().cloned().collect())
    }

    // ---- prompts ----

    pub fn create_prompt(&self, mut prompt: Prompt) -> Result<String> {
        let mut inner = self.write()?;
        if prompt.id.is_empty() {
            let Inner {
                prompts,
                next_prompt_id,
                ..
            } = &mut *inner;
            prompt.id = next_id(next_prompt_id, |id| prompts.contains_key(id));
        }
        if prompt.created_at.is_none() {
            prompt.created_at = Some(Utc::now());
        }
        let id = prompt.id.clone();
        inner.prompts.insert(id.clone(), prompt);
        Ok(id)
    }

    pub fn get_prompt(&self, id: &str) -> Result<Prompt> {
        self.read()?
            .prompts
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found("prompt", id))
    }

    /// Prompts of one user, oldest first.
    pub fn list_prompts_for_user(&self, user_id: &str) -> Result<Vec<Prompt>> {
        let mut prompts: Vec<Prompt> = self
            .read()?
            .prompts
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        prompts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(prompts)
    }

    pub fn delete_prompt(&self, id: &str) -> Result<()> {
        self.write()?
            .prompts
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("prompt", id))
    }

    // ---- lifecycle ----

    /// Drop every record and reset the id counters. Any later call returns
    /// [`Error::StoreClosed`]. Closing twice is a no-op.
    pub fn close(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *inner = Inner {
            closed: true,
            ..Inner::default()
        };
    }

    pub fn is_closed(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .closed
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw the next counter value, skipping any id a caller already claimed.
fn next_id(counter: &mut u64, taken: impl Fn(&str) -> bool) -> String {
    loop {
        *counter += 1;
        let candidate = counter.to_string();
        if !taken(&candidate) {
            return candidate;
        }
    }
}
