//! The signed API client
//!
//! `BiliClient` is the single entry point to the platform: it owns the HTTP
//! connection pool, the swappable session context, the signing strategy, and
//! the signing-key cache.
//!
//! # Components
//!
//! - `transport`: the request pipeline (sign, encode, send, unwrap envelope)
//!   plus session refresh, login probing, and key derivation
//! - `api`: the one-shot endpoint accessors (search, detail, play-url,
//!   creator videos, comment/reply pages)

mod api;
mod transport;

// Re-export main types
pub use transport::{BiliClient, DEFAULT_HOST, DEFAULT_USER_AGENT};
