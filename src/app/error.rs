use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedcastError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Network error: {status_text}")]
    Network { status_text: String },

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("Media playback error: {0}")]
    MediaPlayback(String),

    #[error("Station directory error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Station index {index} out of range ({len} stations)")]
    StationOutOfRange { index: usize, len: usize },

    #[error("Request superseded")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl FeedcastError {
    pub fn network(status_text: impl Into<String>) -> Self {
        Self::Network {
            status_text: status_text.into(),
        }
    }

    pub fn parse(cause: impl std::fmt::Display) -> Self {
        Self::FeedParse(cause.to_string())
    }

    /// Transport failures and non-2xx responses both count as network errors.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Network { .. })
    }
}

pub type Result<T> = std::result::Result<T, FeedcastError>;
