//! Wire-format data model for the Bilibili web API
//!
//! This module defines the shapes this crate reads off the wire:
//!
//! - `Envelope`: the `{code, message, data}` wrapper every JSON endpoint uses
//! - `CommentPage` / `ReplyPage`: the two paginated reply shapes the crawler walks
//! - `NavData`: the account-status payload (login flag + signing-key URLs)
//! - `SearchOrder` / `CommentOrder`: wire enums for result ordering

mod comment;
mod envelope;
mod field;
mod nav;

// Re-export main types
pub use comment::{CommentCursor, CommentNode, CommentPage, PageInfo, ReplyPage};
pub use envelope::Envelope;
pub use field::{CommentOrder, SearchOrder};
pub use nav::{NavData, WbiImg};
