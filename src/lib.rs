//! Bilicrawl: a signed Bilibili web-API client and comment crawler
//!
//! This crate implements a read-only client for the Bilibili web API. It
//! derives the per-session wbi signing keys, signs request parameters, and
//! walks paginated comment trees (top-level threads plus nested replies)
//! under an item budget with a fixed pause between page fetches.

pub mod client;
pub mod config;
pub mod crawler;
pub mod models;
pub mod session;
pub mod sign;
pub mod storage;

use thiserror::Error;

/// Main error type for bilicrawl operations
#[derive(Debug, Error)]
pub enum BiliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API rejected request: {0}")]
    DataFetch(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Signing keys unavailable: {0}")]
    SigningUnavailable(String),

    #[error("Transport failure for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Unexpected payload shape: {0}")]
    Payload(String),

    #[error("Browser session error: {0}")]
    Session(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for bilicrawl operations
pub type Result<T> = std::result::Result<T, BiliError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use client::BiliClient;
pub use config::Config;
pub use crawler::{CancelToken, CommentCrawler, CrawlOptions, PageSink};
pub use models::{CommentNode, CommentOrder, Envelope, SearchOrder};
pub use session::{BrowserSession, RawCookie, SessionContext};
pub use sign::{ParamMap, SignStrategy, SigningKeyPair, WbiSigner};
