//! # docsift
//!
//! Extract text from local documents, search it, convert it between
//! formats, and ingest it into an in-memory document store.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────────┐
//! │    Files    │──▶│   Registry   │──▶│ DocumentContent  │
//! │ txt/md/html │   │ ext → proc.  │   │ text + metadata  │
//! │  pdf/docx   │   └──────────────┘   └────────┬─────────┘
//! └─────────────┘                               │
//!                     ┌─────────────┬───────────┼────────────┐
//!                     ▼             ▼           ▼            ▼
//!                ┌─────────┐  ┌───────────┐ ┌────────┐ ┌───────────┐
//!                │ search  │  │ highlight │ │convert │ │  ingest   │
//!                └─────────┘  └───────────┘ └────────┘ │ → store   │
//!                                                      └───────────┘
//! ```
//!
//! Pure pieces (models, the store, chunking, the line matcher) live in the
//! `docsift-core` crate.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`extract`] | Per-format text extraction |
//! | [`registry`] | Extension → processor dispatch |
//! | [`search`] | Keyword and regex search over files |
//! | [`convert`] | Markdown / HTML / text conversion |
//! | [`ingest`] | Validation, extraction and chunking into the store |
//! | [`scan`] | Directory walking for CLI inputs |
//! | [`commands`] | CLI command implementations |
//! | [`logging`] | Tracing subscriber setup |

pub mod commands;
pub mod config;
pub mod convert;
pub mod extract;
pub mod ingest;
pub mod logging;
pub mod registry;
pub mod scan;
pub mod search;
