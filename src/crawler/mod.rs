//! Paginated comment-tree traversal
//!
//! This module walks a video's comment data page by page:
//!
//! - `CommentCrawler`: the top-level (cursor) and nested (page-number)
//!   traversal state machines
//! - `CrawlBudget`: the accumulated-item cap that ends a top-level walk
//! - `PageSink` / `MemorySink`: where fetched pages are delivered
//! - `CancelToken`: cooperative stop signal checked between pages

mod budget;
mod comments;
mod sink;

// Re-export main types
pub use budget::CrawlBudget;
pub use comments::{CommentCrawler, CrawlOptions};
pub use sink::{CancelToken, MemorySink, PageSink};
