//! Signing-key bundle parse errors

use std::borrow::Cow;

use crate::{KeyEncodingError, UserFacingError};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ParseError {
    #[error("key #{index} in {origin} is invalid: {reason}")]
    InvalidKey {
        origin: String,
        index: usize,
        reason: KeyEncodingError,
    },

    #[error("no signing keys found in {origin}")]
    EmptyBundle { origin: String },
}

impl UserFacingError for ParseError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        Some("The published signing keys are unusable; no download can be trusted until they are fixed.")
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidKey { .. } => "bundle.invalid_key",
            Self::EmptyBundle { .. } => "bundle.empty",
        };
        Some(code)
    }
}
