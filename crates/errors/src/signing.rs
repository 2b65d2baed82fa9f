//! Trust and signature verification error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Failures establishing trust in the signing-key bundle
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum TrustError {
    #[error("trust store has no root keys")]
    EmptyTrustStore,

    #[error(
        "signature {signature_url:?} for key {bundle_url:?} does not validate with any of {roots} known root keys"
    )]
    UntrustedBundle {
        bundle_url: String,
        signature_url: String,
        roots: usize,
    },

    #[error("malformed bundle signature at {url}: {reason}")]
    MalformedSignature { url: String, reason: String },
}

impl UserFacingError for TrustError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::EmptyTrustStore => Some("This build was compiled without any root keys."),
            Self::UntrustedBundle { .. } | Self::MalformedSignature { .. } => Some(
                "Either you are under attack, or this client is too old to know the current root keys.",
            ),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::EmptyTrustStore => "trust.empty_store",
            Self::UntrustedBundle { .. } => "trust.untrusted_bundle",
            Self::MalformedSignature { .. } => "trust.malformed_signature",
        };
        Some(code)
    }
}

/// Failures verifying an artifact against the signing-key bundle
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum VerificationError {
    #[error(
        "signature {signature_url:?} for {artifact_url:?} does not validate with any of {keys} current signing keys"
    )]
    SignatureMismatch {
        artifact_url: String,
        signature_url: String,
        keys: usize,
    },

    #[error("malformed signature at {url}: {reason}")]
    MalformedSignature { url: String, reason: String },
}

impl UserFacingError for VerificationError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        Some(
            "Discard the downloaded file. Either you are under attack, or the file was signed with a retired signing key.",
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::SignatureMismatch { .. } => "verify.signature_mismatch",
            Self::MalformedSignature { .. } => "verify.malformed_signature",
        };
        Some(code)
    }
}
