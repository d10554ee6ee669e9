use crate::client::{DEFAULT_HOST, DEFAULT_USER_AGENT};
use serde::Deserialize;

/// Main configuration structure for Bilicrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub targets: TargetsConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub output: OutputConfig,
}

/// API host and transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the API host
    pub host: String,

    /// Request timeout in seconds
    #[serde(rename = "timeout-seconds")]
    pub timeout_seconds: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            timeout_seconds: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Pause between page fetches (milliseconds)
    #[serde(rename = "crawl-interval-ms")]
    pub crawl_interval_ms: u64,

    /// Maximum top-level comments to collect per video
    #[serde(rename = "max-comments")]
    pub max_comments: usize,

    /// Whether to descend into reply threads
    #[serde(rename = "fetch-replies")]
    pub fetch_replies: bool,

    /// Page size for nested reply fetches
    #[serde(rename = "reply-page-size")]
    pub reply_page_size: u32,

    /// How long a resume checkpoint stays usable (hours)
    #[serde(rename = "resume-window-hours")]
    pub resume_window_hours: i64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            crawl_interval_ms: 1000,
            max_comments: 100,
            fetch_replies: false,
            reply_page_size: 10,
            resume_window_hours: 72,
        }
    }
}

/// Crawl target lists
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
    /// Video ids (aids) whose comments to crawl
    pub videos: Vec<String>,

    /// Creator ids (mids) whose uploads to walk
    pub creators: Vec<String>,
}

/// Session material configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Path to a captured browser-session snapshot (JSON)
    #[serde(rename = "session-file")]
    pub session_file: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}
