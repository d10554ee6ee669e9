//! Storage module for persisting crawl data
//!
//! This module handles persistence for the crawler, including:
//! - SQLite database initialization and schema management
//! - Flat payload tables for videos, comments, and creators
//! - A settings namespace carrying the crawl-resume checkpoint

mod checkpoint;
mod schema;
mod sqlite;
mod traits;

pub use checkpoint::{load_checkpoint, save_checkpoint, CrawlCheckpoint, CHECKPOINT_KEY};
pub use schema::{initialize_schema, SCHEMA_SQL};
pub use sqlite::SqliteStore;
pub use traits::{Store, StoreError, StoreResult};

use crate::BiliError;

use std::path::Path;

/// Initializes or opens a store database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully initialized store
/// * `Err(BiliError)` - Failed to initialize the store
pub fn open_store(path: &Path) -> Result<SqliteStore, BiliError> {
    Ok(SqliteStore::new(path)?)
}
