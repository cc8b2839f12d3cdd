//! Error types shared by the fetch pipeline.

use thiserror::Error;

use crate::models::dashboard::NoticeLevel;

/// Outcome of a failed CoinGecko fetch.
///
/// Fetchers never render these themselves; the dashboard layer turns them into
/// user notices (see [`FetchError::notice_level`]) and degrades to an empty result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("CoinGecko API error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Request failed: {0}")]
    Transport(String),
}

impl FetchError {
    /// Which notice the user should see for this failure, if any.
    /// Malformed bodies degrade silently.
    pub fn notice_level(&self) -> Option<NoticeLevel> {
        match self {
            FetchError::RateLimited => Some(NoticeLevel::Warning),
            FetchError::Upstream { .. } | FetchError::Transport(_) => Some(NoticeLevel::Error),
            FetchError::Malformed(_) => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}
