/// Comment and reply page shapes
///
/// The reply endpoints return two different paginated shapes: top-level
/// comment pages carry a `cursor` block (`is_end` + `next`), nested reply
/// pages carry a `page` block (`num`/`size`/`count`). Both wrap the same
/// node payloads, which this crate keeps as raw JSON and indexes only by
/// the handful of fields the traversal needs.
use serde_json::Value;

use crate::{BiliError, Result};

/// One comment (or nested reply) as returned by the reply endpoints
///
/// The full payload is kept untouched in `raw` so storage writes exactly
/// what the platform sent; the typed fields exist only to drive traversal.
#[derive(Debug, Clone)]
pub struct CommentNode {
    /// Platform-assigned comment id (wire `rpid`)
    pub id: i64,

    /// Parent comment id; `None` for top-level comments (wire `parent` of 0)
    pub parent_id: Option<i64>,

    /// Number of nested replies under this node (wire `rcount`)
    pub reply_count: i64,

    /// The complete untouched payload
    pub raw: Value,
}

impl CommentNode {
    /// Parses a node from its raw payload
    ///
    /// Returns `None` when the payload carries no usable `rpid`; such nodes
    /// cannot be keyed for storage or walked for replies.
    pub fn from_raw(raw: Value) -> Option<Self> {
        let id = raw.get("rpid").and_then(Value::as_i64)?;
        let parent_id = raw
            .get("parent")
            .and_then(Value::as_i64)
            .filter(|parent| *parent > 0);
        let reply_count = raw.get("rcount").and_then(Value::as_i64).unwrap_or(0);

        Some(Self {
            id,
            parent_id,
            reply_count,
            raw,
        })
    }

    /// Returns true if the platform reports nested replies under this node
    pub fn has_replies(&self) -> bool {
        self.reply_count > 0
    }
}

/// Pagination cursor on top-level comment pages
#[derive(Debug, Clone, Copy)]
pub struct CommentCursor {
    /// True when the server reports no further pages
    pub is_end: bool,
    /// Opaque offset to request the next page with
    pub next: i64,
}

/// One page of top-level comments plus the cursor to the next page
#[derive(Debug, Clone)]
pub struct CommentPage {
    pub cursor: CommentCursor,
    pub replies: Vec<CommentNode>,
}

impl CommentPage {
    /// Parses a page from the unwrapped `data` payload
    ///
    /// # Returns
    /// `BiliError::Payload` when the cursor block is missing or unreadable.
    /// A missing or null `replies` array is an empty page, not an error.
    pub fn from_data(data: Value) -> Result<Self> {
        let cursor = data
            .get("cursor")
            .ok_or_else(|| BiliError::Payload("comment page without cursor".to_string()))?;
        let is_end = cursor
            .get("is_end")
            .and_then(Value::as_bool)
            .ok_or_else(|| BiliError::Payload("comment cursor without is_end".to_string()))?;
        let next = cursor
            .get("next")
            .and_then(Value::as_i64)
            .ok_or_else(|| BiliError::Payload("comment cursor without next".to_string()))?;
        let replies = parse_reply_list(&data);

        Ok(Self {
            cursor: CommentCursor { is_end, next },
            replies,
        })
    }
}

/// Pagination block on nested reply pages
#[derive(Debug, Clone, Copy)]
pub struct PageInfo {
    /// Current page number
    pub num: i64,
    /// Page size the server applied
    pub size: i64,
    /// Total reply count under the root comment
    pub count: i64,
}

/// One page of nested replies under a single root comment
#[derive(Debug, Clone)]
pub struct ReplyPage {
    pub page: PageInfo,
    pub replies: Vec<CommentNode>,
}

impl ReplyPage {
    /// Parses a page from the unwrapped `data` payload
    ///
    /// # Returns
    /// `BiliError::Payload` when the `page` block or its `count` is missing;
    /// the traversal cannot decide termination without the total count.
    pub fn from_data(data: Value) -> Result<Self> {
        let page = data
            .get("page")
            .ok_or_else(|| BiliError::Payload("reply page without page block".to_string()))?;
        let count = page
            .get("count")
            .and_then(Value::as_i64)
            .ok_or_else(|| BiliError::Payload("reply page without count".to_string()))?;
        let num = page.get("num").and_then(Value::as_i64).unwrap_or(0);
        let size = page.get("size").and_then(Value::as_i64).unwrap_or(0);
        let replies = parse_reply_list(&data);

        Ok(Self {
            page: PageInfo { num, size, count },
            replies,
        })
    }
}

/// Extracts the `replies` array, skipping nodes without a usable id
///
/// The platform sends `"replies": null` for empty pages; both that and a
/// missing key parse as an empty list.
fn parse_reply_list(data: &Value) -> Vec<CommentNode> {
    match data.get("replies").and_then(Value::as_array) {
        Some(list) => list
            .iter()
            .filter_map(|raw| {
                let node = CommentNode::from_raw(raw.clone());
                if node.is_none() {
                    tracing::warn!("Skipping reply payload without a usable rpid");
                }
                node
            })
            .collect(),
        None => Vec::new(),
    }
}
