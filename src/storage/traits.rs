//! Storage trait definitions
//!
//! Defines the abstract interface for record persistence, allowing the
//! crawler to work with different storage backends. Records are opaque
//! JSON payloads keyed by caller-supplied platform ids; the store never
//! interprets crawl semantics.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Flat record store for fetched payloads
///
/// Three record kinds (content, comment, creator) plus a small settings
/// namespace. Upserting the same id twice replaces the payload wholesale;
/// queries return the stored payload or `None`.
pub trait Store {
    // ===== Content Records =====

    /// Inserts or replaces a content record
    ///
    /// # Arguments
    ///
    /// * `content_id` - Platform id of the content (e.g. a video aid)
    /// * `record` - Full payload to persist
    ///
    /// # Returns
    ///
    /// * `Ok(i64)` - Rowid of the stored record
    /// * `Err(StoreError)` - Database or serialization failure
    fn upsert_content(&mut self, content_id: &str, record: &Value) -> StoreResult<i64>;

    /// Fetches a content record by id
    fn query_content(&self, content_id: &str) -> StoreResult<Option<Value>>;

    // ===== Comment Records =====

    /// Inserts or replaces a comment record
    ///
    /// Top-level comments and nested replies share one table; the id is
    /// the platform comment id either way.
    fn upsert_comment(&mut self, comment_id: &str, record: &Value) -> StoreResult<i64>;

    /// Fetches a comment record by id
    fn query_comment(&self, comment_id: &str) -> StoreResult<Option<Value>>;

    // ===== Creator Records =====

    /// Inserts or replaces a creator record
    fn upsert_creator(&mut self, creator_id: &str, record: &Value) -> StoreResult<i64>;

    /// Fetches a creator record by id
    fn query_creator(&self, creator_id: &str) -> StoreResult<Option<Value>>;

    // ===== Settings =====

    /// Inserts or replaces a setting payload
    ///
    /// Settings are a small key/value namespace for crawl bookkeeping
    /// (resume checkpoints and similar), not fetched data.
    fn upsert_setting(&mut self, key: &str, record: &Value) -> StoreResult<i64>;

    /// Fetches a setting payload by key
    fn get_setting(&self, key: &str) -> StoreResult<Option<Value>>;
}
