//! Error types for affiliation harvesting.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while harvesting or persisting affiliation records.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HarvestError {
    /// Harvest parameters are unusable.
    #[error("invalid harvest configuration: {0}")]
    InvalidConfig(String),

    /// The request never produced a response (connect failure, timeout).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("could not decode response body: {0}")]
    Decode(String),

    /// The JSON envelope lacks the expected `message.items` list.
    #[error("unexpected API response format: {0}")]
    MalformedPage(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl HarvestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the same cursor may be requested again after this failure.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Status { .. } | Self::Decode(_)
        )
    }
}

/// Result type alias for harvest operations.
pub type Result<T> = std::result::Result<T, HarvestError>;
