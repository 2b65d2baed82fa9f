//! Transport and file-system error types for fetches

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("deadline exceeded while fetching {url}")]
    Timeout { url: String },

    #[error("fetch of {url} was cancelled")]
    Cancelled { url: String },

    #[error("connection to {url} failed: {message}")]
    Connect { url: String, message: String },

    #[error("fetching {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP error {status} fetching {url}: {message}")]
    HttpStatus {
        url: String,
        status: u16,
        message: String,
    },

    #[error("response from {url} exceeds the {limit} byte limit")]
    SizeLimitExceeded { url: String, limit: u64 },

    #[error("failed writing {path}: {message}")]
    File { path: String, message: String },
}

impl UserFacingError for FetchError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidUrl(_) => Some("Check the distribution server URL."),
            Self::Timeout { .. } | Self::Connect { .. } | Self::Transport { .. } => {
                Some("Check your network connection and retry.")
            }
            Self::HttpStatus { status, .. } if *status == 404 => {
                Some("The requested file is not published on the distribution server.")
            }
            Self::HttpStatus { .. } => Some("The distribution server returned an error; retry later."),
            Self::SizeLimitExceeded { .. } => {
                Some("The server sent more data than allowed; it may be misconfigured or compromised.")
            }
            Self::File { .. } => Some("Ensure the destination is writable and has free space."),
            Self::Cancelled { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connect { .. } | Self::Transport { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidUrl(_) => "fetch.invalid_url",
            Self::Timeout { .. } => "fetch.timeout",
            Self::Cancelled { .. } => "fetch.cancelled",
            Self::Connect { .. } => "fetch.connect",
            Self::Transport { .. } => "fetch.transport",
            Self::HttpStatus { .. } => "fetch.http_status",
            Self::SizeLimitExceeded { .. } => "fetch.size_limit",
            Self::File { .. } => "fetch.file",
        };
        Some(code)
    }
}
