//! Comment-tree traversal
//!
//! Two cooperating state machines walk a video's comment data:
//!
//! - the top-level walk follows the server cursor (`is_end`/`next`) under
//!   an item budget
//! - the nested walk drains one comment's replies by page number until the
//!   server-reported total is covered
//!
//! Both hold exactly one request in flight and pause for a fixed interval
//! after every page.

use std::time::Duration;

use crate::client::BiliClient;
use crate::models::{CommentNode, CommentOrder};
use crate::Result;

use super::{CancelToken, CrawlBudget, PageSink};

/// Default page size for nested reply pages
const REPLY_PAGE_SIZE: i64 = 10;

/// Tuning knobs for a comment traversal
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Upper bound on accumulated top-level comments
    pub max_items: usize,
    /// Pause after every page fetch
    pub interval: Duration,
    /// Whether to drain each comment's nested replies
    pub fetch_replies: bool,
    /// Thread ordering requested from the platform
    pub order: CommentOrder,
    /// Page size for nested reply pages
    pub reply_page_size: i64,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_items: 100,
            interval: Duration::from_millis(1000),
            fetch_replies: false,
            order: CommentOrder::Default,
            reply_page_size: REPLY_PAGE_SIZE,
        }
    }
}

/// Walks comment trees page by page through a shared client
pub struct CommentCrawler<'a> {
    client: &'a BiliClient,
    options: CrawlOptions,
    cancel: CancelToken,
}

impl<'a> CommentCrawler<'a> {
    pub fn new(client: &'a BiliClient, options: CrawlOptions) -> Self {
        Self {
            client,
            options,
            cancel: CancelToken::new(),
        }
    }

    /// Returns a handle that stops the traversal between pages
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Crawls a video's top-level comment thread
    ///
    /// Two delivery modes share this loop:
    ///
    /// - replies disabled: every delivered page is also appended to the
    ///   returned buffer, and the buffer's length is what the item budget
    ///   caps.
    /// - replies enabled: pages (top-level and nested alike) reach the
    ///   caller only through the sink. The returned buffer stays empty, so
    ///   the item budget never trips and the walk runs to the platform's
    ///   end of stream; each delivered top-level page is still clamped to
    ///   `max_items`.
    ///
    /// A fired cancel token ends the walk cleanly between pages with
    /// whatever was collected so far. Client and sink errors abort the walk
    /// and propagate unchanged.
    ///
    /// # Arguments
    ///
    /// * `video_id` - the video's numeric id (`oid` on the wire)
    /// * `sink` - receives every page in fetch order
    pub async fn crawl_video_comments(
        &self,
        video_id: &str,
        sink: &dyn PageSink,
    ) -> Result<Vec<CommentNode>> {
        tracing::info!("Crawling comments for video {}", video_id);

        let mut collected: Vec<CommentNode> = Vec::new();
        let mut budget = CrawlBudget::new(self.options.max_items);
        let mut is_end = false;
        let mut next = 0;

        while !is_end && !budget.is_exhausted() {
            if self.cancel.is_cancelled() {
                tracing::info!("Comment crawl cancelled for video {}", video_id);
                break;
            }

            let page = self
                .client
                .comment_page(video_id, self.options.order, next)
                .await?;
            is_end = page.cursor.is_end;
            next = page.cursor.next;
            let mut nodes = page.replies;

            if self.options.fetch_replies {
                for node in &nodes {
                    if node.has_replies() {
                        self.crawl_comment_replies(video_id, node.id, sink).await?;
                    }
                }
            }

            budget.clamp_page(&mut nodes);
            sink.on_page(video_id, &nodes).await?;
            tokio::time::sleep(self.options.interval).await;

            if !self.options.fetch_replies {
                budget.record(nodes.len());
                collected.extend(nodes);
            }
        }

        tracing::info!(
            "Comment crawl for video {} done: {} comments accumulated",
            video_id,
            collected.len()
        );

        Ok(collected)
    }

    /// Drains every page of nested replies under one root comment
    ///
    /// Pages are delivered to the sink tagged with the video id, matching
    /// the top-level pages they hang under. No item budget applies here;
    /// the walk ends when the server-reported total is covered or the
    /// cancel token fires.
    pub async fn crawl_comment_replies(
        &self,
        video_id: &str,
        root_id: i64,
        sink: &dyn PageSink,
    ) -> Result<()> {
        tracing::debug!("Draining replies under comment {}", root_id);

        let mut pn = 1;
        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("Reply crawl cancelled for comment {}", root_id);
                break;
            }

            let page = self
                .client
                .reply_page(
                    video_id,
                    root_id,
                    pn,
                    self.options.reply_page_size,
                    self.options.order,
                )
                .await?;

            sink.on_page(video_id, &page.replies).await?;
            tokio::time::sleep(self.options.interval).await;

            if page.page.count <= pn * self.options.reply_page_size {
                break;
            }
            pn += 1;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = CrawlOptions::default();

        assert_eq!(options.max_items, 100);
        assert_eq!(options.interval, Duration::from_millis(1000));
        assert!(!options.fetch_replies);
        assert_eq!(options.order, CommentOrder::Default);
        assert_eq!(options.reply_page_size, 10);
    }
}
