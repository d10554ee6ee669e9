/// Browsing-session collaborator
///
/// Login happens in a real browser, not here. The client only consumes a
/// snapshot of the resulting state: the cookie jar plus local storage
/// (which caches the signing-key image URLs between page loads).
use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{BiliError, Result};

/// A cookie as captured from a browsing session
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawCookie {
    pub name: String,
    pub value: String,
}

/// A live (or snapshotted) authenticated browsing session
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Captured cookies for the platform domain
    async fn cookies(&self) -> Result<Vec<RawCookie>>;

    /// Client-side local storage of the platform page
    async fn local_storage(&self) -> Result<HashMap<String, String>>;
}

/// On-disk shape of an exported session snapshot
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub cookies: Vec<RawCookie>,
    #[serde(default)]
    pub local_storage: HashMap<String, String>,
}

/// A `BrowserSession` backed by a JSON snapshot file
///
/// The snapshot is exported once from an authenticated browser and reused
/// across runs:
///
/// ```json
/// {
///   "cookies": [{"name": "SESSDATA", "value": "..."}],
///   "local_storage": {"wbi_img_urls": "https://...png-https://...png"}
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileBrowserSession {
    snapshot: SessionSnapshot,
}

impl FileBrowserSession {
    /// Loads a snapshot from `path`
    ///
    /// # Returns
    ///
    /// * `Ok(FileBrowserSession)` - snapshot read and parsed
    /// * `Err(BiliError::Session)` - unreadable or malformed snapshot
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            BiliError::Session(format!(
                "cannot read session snapshot {}: {}",
                path.display(),
                err
            ))
        })?;
        let snapshot: SessionSnapshot = serde_json::from_str(&content).map_err(|err| {
            BiliError::Session(format!(
                "cannot parse session snapshot {}: {}",
                path.display(),
                err
            ))
        })?;

        Ok(Self { snapshot })
    }
}

#[async_trait]
impl BrowserSession for FileBrowserSession {
    async fn cookies(&self) -> Result<Vec<RawCookie>> {
        Ok(self.snapshot.cookies.clone())
    }

    async fn local_storage(&self) -> Result<HashMap<String, String>> {
        Ok(self.snapshot.local_storage.clone())
    }
}
