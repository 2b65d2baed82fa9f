//! Key loading and key encoding error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Why a single PEM-style key block was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyEncodingError {
    #[error("failed to decode PEM data")]
    NoBlock,

    #[error("malformed PEM block: {message}")]
    Malformed { message: String },

    #[error("trailing data after PEM block")]
    TrailingData,

    #[error("PEM type is {found:?}, want {expected:?}")]
    WrongTag { expected: String, found: String },

    #[error("{tag} has {actual} bytes, want {expected}")]
    WrongLength {
        tag: String,
        expected: usize,
        actual: usize,
    },

    #[error("not a valid Ed25519 key: {message}")]
    InvalidKey { message: String },
}

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum KeyError {
    #[error("failed to read key file {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("failed to parse {path}: {reason}")]
    Invalid {
        path: String,
        reason: KeyEncodingError,
    },

    #[error("signing failed: {message}")]
    Signing { message: String },
}

impl UserFacingError for KeyError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Unreadable { .. } => Some("Check that the key file exists and is readable."),
            Self::Invalid { .. } => Some(
                "The key file must hold exactly one block produced by `distsign keygen`.",
            ),
            Self::Signing { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Unreadable { .. } => "key.unreadable",
            Self::Invalid { .. } => "key.invalid",
            Self::Signing { .. } => "key.signing_failed",
        };
        Some(code)
    }
}
