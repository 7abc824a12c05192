use crate::types::Platform;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("Review data unavailable for {platform} ({path}): {reason}")]
    DataUnavailable {
        platform: Platform,
        path:     String,
        reason:   String,
    },

    #[error("Invalid rating filter [{lo}, {hi}]: bounds must satisfy 1 <= lo <= hi <= 5")]
    InvalidFilter { lo: i64, hi: i64 },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InsightsError {
    /// True for errors that must abort dashboard startup.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, InsightsError::InvalidFilter { .. })
    }
}

pub type InsightsResult<T> = Result<T, InsightsError>;
