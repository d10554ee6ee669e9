/// Page delivery and cooperative cancellation
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::models::CommentNode;
use crate::Result;

/// Receives each fetched page, in fetch order
///
/// `on_page` is awaited before the next page is fetched, so a slow sink
/// backpressures the traversal. A sink error aborts the traversal and
/// propagates to the caller unchanged.
#[async_trait]
pub trait PageSink: Send + Sync {
    /// Delivers one page of nodes belonging to `owner_id`
    ///
    /// Nested reply pages arrive with the video id as `owner_id`, the same
    /// as the top-level pages they hang under.
    async fn on_page(&self, owner_id: &str, items: &[CommentNode]) -> Result<()>;
}

/// A sink that keeps every delivered page in memory
///
/// The usual way to receive data from a reply-draining walk, where the
/// traversal's own return buffer stays empty.
#[derive(Debug, Default)]
pub struct MemorySink {
    pages: Mutex<Vec<(String, Vec<CommentNode>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the delivered page sizes, in delivery order
    pub fn page_sizes(&self) -> Vec<usize> {
        self.pages
            .lock()
            .unwrap()
            .iter()
            .map(|(_, items)| items.len())
            .collect()
    }

    /// Returns every delivered node, flattened in delivery order
    pub fn items(&self) -> Vec<CommentNode> {
        self.pages
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(_, items)| items.clone())
            .collect()
    }

    /// Returns the owner id each page was delivered under
    pub fn owners(&self) -> Vec<String> {
        self.pages
            .lock()
            .unwrap()
            .iter()
            .map(|(owner, _)| owner.clone())
            .collect()
    }
}

#[async_trait]
impl PageSink for MemorySink {
    async fn on_page(&self, owner_id: &str, items: &[CommentNode]) -> Result<()> {
        self.pages
            .lock()
            .unwrap()
            .push((owner_id.to_string(), items.to_vec()));
        Ok(())
    }
}

/// Cooperative stop signal, checked between page fetches
///
/// Clones share one flag. A fired token ends the traversal cleanly after
/// the page in flight; it is a stop, not an error.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop; visible to every clone of this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
