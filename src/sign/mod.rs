//! Request-parameter signing
//!
//! Most read endpoints only answer requests whose query carries a `w_rid`
//! signature. This module holds the two halves of that scheme:
//!
//! - `SigningKeyPair`: the per-session img/sub keys, extracted from image
//!   URL basenames (browser local storage or the navigation payload)
//! - `WbiSigner`: the transform that sorts, filters, and digests the
//!   parameters into the final signed set
//!
//! Signing is pure and synchronous; fetching and caching the keys is the
//! client's job.

mod keys;
mod wbi;

// Re-export main types
pub use keys::SigningKeyPair;
pub use wbi::{encode_query, mixin_key, ParamMap, SignStrategy, WbiSigner};
