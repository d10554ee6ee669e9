//! SQLite storage backend implementation
//!
//! This module provides a SQLite-based implementation of the Store trait.
//! Payloads are serialized to JSON text columns; each record kind lives in
//! its own flat table keyed by the platform id.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Store, StoreResult};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;

/// SQLite implementation of the Store trait
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates a new SQLite store
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the database file (created if missing)
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened store
    /// * `Err(StoreError)` - Failed to open or initialize the database
    pub fn new(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
            PRAGMA mmap_size = 268435456;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl Store for SqliteStore {
    // ===== Content Records =====

    fn upsert_content(&mut self, content_id: &str, record: &Value) -> StoreResult<i64> {
        let payload = serde_json::to_string(record)?;
        let now = Utc::now().to_rfc3339();

        let rowid = self.conn.query_row(
            "INSERT INTO video (video_id, payload, fetched_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(video_id) DO UPDATE SET
                 payload = excluded.payload,
                 fetched_at = excluded.fetched_at
             RETURNING rowid",
            params![content_id, payload, now],
            |row| row.get(0),
        )?;

        Ok(rowid)
    }

    fn query_content(&self, content_id: &str) -> StoreResult<Option<Value>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM video WHERE video_id = ?1",
                params![content_id],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    // ===== Comment Records =====

    fn upsert_comment(&mut self, comment_id: &str, record: &Value) -> StoreResult<i64> {
        let payload = serde_json::to_string(record)?;
        let now = Utc::now().to_rfc3339();

        let rowid = self.conn.query_row(
            "INSERT INTO video_comment (comment_id, payload, fetched_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(comment_id) DO UPDATE SET
                 payload = excluded.payload,
                 fetched_at = excluded.fetched_at
             RETURNING rowid",
            params![comment_id, payload, now],
            |row| row.get(0),
        )?;

        Ok(rowid)
    }

    fn query_comment(&self, comment_id: &str) -> StoreResult<Option<Value>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM video_comment WHERE comment_id = ?1",
                params![comment_id],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    // ===== Creator Records =====

    fn upsert_creator(&mut self, creator_id: &str, record: &Value) -> StoreResult<i64> {
        let payload = serde_json::to_string(record)?;
        let now = Utc::now().to_rfc3339();

        let rowid = self.conn.query_row(
            "INSERT INTO up_info (user_id, payload, fetched_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET
                 payload = excluded.payload,
                 fetched_at = excluded.fetched_at
             RETURNING rowid",
            params![creator_id, payload, now],
            |row| row.get(0),
        )?;

        Ok(rowid)
    }

    fn query_creator(&self, creator_id: &str) -> StoreResult<Option<Value>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM up_info WHERE user_id = ?1",
                params![creator_id],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    // ===== Settings =====

    fn upsert_setting(&mut self, key: &str, record: &Value) -> StoreResult<i64> {
        let payload = serde_json::to_string(record)?;
        let now = Utc::now().to_rfc3339();

        let rowid = self.conn.query_row(
            "INSERT INTO setting (key, payload, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                 payload = excluded.payload,
                 updated_at = excluded.updated_at
             RETURNING rowid",
            params![key, payload, now],
            |row| row.get(0),
        )?;

        Ok(rowid)
    }

    fn get_setting(&self, key: &str) -> StoreResult<Option<Value>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM setting WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }
}
