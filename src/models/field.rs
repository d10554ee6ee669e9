/// Wire enums for result ordering
///
/// These map directly onto the `order` / `mode` query parameters the search
/// and reply endpoints expect.
use std::fmt;

/// Sort order for keyword search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchOrder {
    /// Platform-weighted relevance ranking (the `order` parameter is empty)
    #[default]
    Default,

    /// Most clicked first
    MostClick,

    /// Latest published first
    LatestPublish,

    /// Most danmaku (overlay comments) first
    MostDanmaku,

    /// Most favorited first
    MostFavorite,
}

impl SearchOrder {
    /// Returns the `order` query-parameter value the search endpoints expect
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Default => "",
            Self::MostClick => "click",
            Self::LatestPublish => "pubdate",
            Self::MostDanmaku => "dm",
            Self::MostFavorite => "stow",
        }
    }
}

impl fmt::Display for SearchOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_param())
    }
}

/// Sort order for comment threads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentOrder {
    /// Hot comments only
    #[default]
    Default,

    /// Hot and recent interleaved
    Mixed,

    /// Strictly newest first
    Time,
}

impl CommentOrder {
    /// Returns the numeric `mode` query-parameter value the reply endpoints expect
    pub fn as_mode(&self) -> i64 {
        match self {
            Self::Default => 0,
            Self::Mixed => 1,
            Self::Time => 2,
        }
    }
}
