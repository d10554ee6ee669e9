//! Crawl-resume checkpoint
//!
//! Starting a creator records a checkpoint in the settings namespace.
//! On the next run, a checkpoint that is still fresh lets the crawl skip
//! ahead to the recorded creator instead of restarting from the top of
//! the target list. A changed configuration invalidates the checkpoint
//! through its hash; so does age beyond the resume window.

use crate::storage::traits::{Store, StoreResult};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Settings key the checkpoint is stored under
pub const CHECKPOINT_KEY: &str = "crawl.checkpoint";

/// Position marker for resuming a creator crawl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlCheckpoint {
    /// Creator whose crawl was last started
    pub creator_id: String,
    /// Hash of the configuration the crawl ran with
    pub config_hash: String,
    /// When the checkpoint was written
    pub saved_at: DateTime<Utc>,
}

impl CrawlCheckpoint {
    /// Creates a checkpoint stamped with the current time
    pub fn new(creator_id: &str, config_hash: &str) -> Self {
        Self {
            creator_id: creator_id.to_string(),
            config_hash: config_hash.to_string(),
            saved_at: Utc::now(),
        }
    }

    /// Returns true while the checkpoint may still drive a resume
    ///
    /// Fresh means the configuration hash still matches and the checkpoint
    /// is at most `window_hours` old.
    pub fn is_fresh(&self, window_hours: i64, config_hash: &str) -> bool {
        if self.config_hash != config_hash {
            return false;
        }

        let age = Utc::now().signed_duration_since(self.saved_at);
        age <= Duration::hours(window_hours)
    }
}

/// Loads the stored checkpoint, if a readable one exists
///
/// A missing checkpoint and an unreadable one are treated the same way:
/// the crawl starts from the top. Unreadable payloads are logged.
pub fn load_checkpoint(store: &dyn Store) -> Option<CrawlCheckpoint> {
    let value = match store.get_setting(CHECKPOINT_KEY) {
        Ok(Some(value)) => value,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!("Failed to read crawl checkpoint: {}", err);
            return None;
        }
    };

    match serde_json::from_value(value) {
        Ok(checkpoint) => Some(checkpoint),
        Err(err) => {
            tracing::warn!("Ignoring malformed crawl checkpoint: {}", err);
            None
        }
    }
}

/// Records `creator_id` as the current crawl position
pub fn save_checkpoint(
    store: &mut dyn Store,
    creator_id: &str,
    config_hash: &str,
) -> StoreResult<()> {
    let checkpoint = CrawlCheckpoint::new(creator_id, config_hash);
    let value = serde_json::to_value(&checkpoint)?;
    store.upsert_setting(CHECKPOINT_KEY, &value)?;
    Ok(())
}
