//! Session and authentication state
//!
//! The client authenticates with cookies captured from a real browsing
//! session; it never drives login itself. This module holds:
//!
//! - `SessionContext`: the immutable header/cookie set requests are sent with
//! - `BrowserSession`: the collaborator trait supplying cookies and local
//!   storage, with `FileBrowserSession` as the snapshot-file implementation

mod browser;
mod context;

// Re-export main types
pub use browser::{BrowserSession, FileBrowserSession, RawCookie, SessionSnapshot};
pub use context::SessionContext;
