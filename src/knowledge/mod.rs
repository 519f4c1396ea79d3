//! Knowledge base storage
//!
//! This module defines the trait interface for knowledge base backends,
//! the entry type they store, and the filesystem implementation that writes
//! one Markdown file per entry plus a generated `index.md`.

mod index;
mod markdown_store;

pub use index::title_case;
pub use markdown_store::MarkdownStore;

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during knowledge base operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for knowledge base operations
pub type StoreResult<T> = Result<T, StoreError>;

/// One mirrored documentation page, identified by `(category, slug)`
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeBaseEntry {
    pub slug: String,
    pub category: String,
    pub title: String,
    /// Markdown body
    pub content: String,
    pub source_url: String,
    pub last_updated: DateTime<Utc>,
}

/// Trait for knowledge base backends
pub trait KnowledgeStore {
    /// Writes an entry, replacing any existing entry with the same identity
    fn write(&self, entry: &KnowledgeBaseEntry) -> StoreResult<()>;

    /// Reads an entry back
    ///
    /// # Returns
    ///
    /// * `Ok(Some(entry))` - The entry exists
    /// * `Ok(None)` - Nothing is stored under `(category, slug)`
    /// * `Err(StoreError)` - The entry exists but could not be read
    fn read(&self, category: &str, slug: &str) -> StoreResult<Option<KnowledgeBaseEntry>>;

    /// Lists stored slugs grouped by category, both sorted
    fn list(&self) -> StoreResult<BTreeMap<String, Vec<String>>>;

    /// Regenerates the top-level index of all entries
    fn update_index(&self) -> StoreResult<()>;
}
