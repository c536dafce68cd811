//! # docsift core
//!
//! Data models, the concurrent in-memory [`store::DocumentStore`], the
//! paragraph chunker, and the text matching engine used by document search.
//!
//! This crate does no filesystem I/O. Reading files and dispatching on
//! format lives in the `docsift` crate.

pub mod chunk;
pub mod error;
pub mod matcher;
pub mod models;
pub mod store;

pub use error::{Error, Result};
