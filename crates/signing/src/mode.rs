//! Signing modes and any-of verification

use distsign_hash::Sha512Digest;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha512,
}

/// How a signature relates to the signed bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningMode {
    /// Plain Ed25519 over the message bytes. Used by root keys on the
    /// small, fully buffered signing-key bundle.
    Raw,
    /// Ed25519ph over a digest of the message. Used by signing keys on
    /// artifacts too large to buffer.
    Prehash(HashAlgorithm),
}

impl fmt::Display for SigningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => f.write_str("raw"),
            Self::Prehash(HashAlgorithm::Sha512) => f.write_str("prehash-sha512"),
        }
    }
}

/// A message in the form its signing mode consumes.
///
/// Carrying the bytes (or digest) inside the mode variant keeps callers
/// from pairing a digest with raw verification or the other way round.
#[derive(Debug, Clone, Copy)]
pub enum Message<'a> {
    Raw(&'a [u8]),
    Prehashed(&'a Sha512Digest),
}

impl Message<'_> {
    #[must_use]
    pub fn mode(&self) -> SigningMode {
        match self {
            Self::Raw(_) => SigningMode::Raw,
            Self::Prehashed(_) => SigningMode::Prehash(HashAlgorithm::Sha512),
        }
    }
}

/// Check a single key. Ed25519ph uses an empty context.
#[must_use]
pub fn verify(key: &VerifyingKey, message: &Message<'_>, signature: &Signature) -> bool {
    match message {
        Message::Raw(bytes) => key.verify(bytes, signature).is_ok(),
        Message::Prehashed(digest) => key
            .verify_prehashed(digest.state(), None, signature)
            .is_ok(),
    }
}

/// Returns the position of the first key that validates `signature`.
pub fn verify_any<'k, I>(keys: I, message: &Message<'_>, signature: &Signature) -> Option<usize>
where
    I: IntoIterator<Item = &'k VerifyingKey>,
{
    keys.into_iter()
        .position(|key| verify(key, message, signature))
}
