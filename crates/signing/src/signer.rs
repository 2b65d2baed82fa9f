//! Private-key holders for the two signing roles

use crate::bundle::parse_public_keys;
use crate::encoding::{decode_private_key, key_id};
use crate::keypair::KeyPair;
use crate::mode::Message;
use distsign_errors::{Error, KeyEncodingError, KeyError, ParseError};
use distsign_hash::Sha512Digest;
use ed25519_dalek::{Signature, Signer as _, SigningKey, VerifyingKey};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Holds exactly one Ed25519 private key.
pub struct Signer {
    key: SigningKey,
}

impl Signer {
    /// Load a private key file in the format produced by
    /// [`KeyPair::private_pem`].
    ///
    /// # Errors
    /// Returns [`KeyError::Unreadable`] if the file cannot be read and
    /// [`KeyError::Invalid`] if its contents are not a single valid
    /// `PRIVATE KEY` block.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let raw = zeroize::Zeroizing::new(tokio::fs::read(path).await.map_err(|e| {
            KeyError::Unreadable {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        })?);

        let signer = Self::from_pem(&raw).map_err(|reason| KeyError::Invalid {
            path: path.display().to_string(),
            reason,
        })?;
        debug!(path = %path.display(), key = %key_id(&signer.verifying_key()), "loaded private key");
        Ok(signer)
    }

    /// Parse a `PRIVATE KEY` block held in memory
    ///
    /// # Errors
    /// Returns an error if the block is malformed, followed by trailing data,
    /// has the wrong tag or length, or its public half does not match the seed.
    pub fn from_pem(data: &[u8]) -> Result<Self, KeyEncodingError> {
        let bytes = decode_private_key(data)?;
        let key = SigningKey::from_keypair_bytes(&bytes).map_err(|e| {
            KeyEncodingError::InvalidKey {
                message: e.to_string(),
            }
        })?;
        Ok(Self { key })
    }

    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    /// Sign message bytes directly, with no pre-hashing
    #[must_use]
    pub fn sign_raw(&self, message: &[u8]) -> Signature {
        self.key.sign(message)
    }

    /// Sign a SHA-512 digest in Ed25519ph mode with an empty context
    ///
    /// # Errors
    /// Returns [`KeyError::Signing`] if the signature cannot be produced.
    pub fn sign_prehashed(&self, digest: &Sha512Digest) -> Result<Signature, Error> {
        self.key
            .sign_prehashed(digest.state(), None)
            .map_err(|e| {
                KeyError::Signing {
                    message: e.to_string(),
                }
                .into()
            })
    }

    /// Sign a message in whichever mode it carries
    ///
    /// # Errors
    /// Returns an error if pre-hashed signing fails.
    pub fn sign(&self, message: &Message<'_>) -> Result<Signature, Error> {
        match message {
            Message::Raw(bytes) => Ok(self.sign_raw(bytes)),
            Message::Prehashed(digest) => self.sign_prehashed(digest),
        }
    }
}

impl From<&KeyPair> for Signer {
    fn from(pair: &KeyPair) -> Self {
        Self {
            key: pair.signing_key().clone(),
        }
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("key_id", &key_id(&self.verifying_key()))
            .finish_non_exhaustive()
    }
}

/// A root key: signs signing-key bundles in raw mode.
#[derive(Debug)]
pub struct RootSigner(Signer);

impl RootSigner {
    /// # Errors
    /// See [`Signer::load`].
    pub async fn load(path: &Path) -> Result<Self, Error> {
        Signer::load(path).await.map(Self)
    }

    #[must_use]
    pub fn new(signer: Signer) -> Self {
        Self(signer)
    }

    /// Sign a bundle of public signing keys (newline-joined `PUBLIC KEY`
    /// blocks). The bundle is parsed first so that a root key never vouches
    /// for an empty or malformed bundle.
    ///
    /// # Errors
    /// Returns a [`ParseError`] if the bundle does not hold at least one
    /// valid public key.
    pub fn sign_signing_keys(&self, bundle: &[u8]) -> Result<Signature, Error> {
        let keys = parse_public_keys(bundle, "signing key bundle")?;
        if keys.is_empty() {
            return Err(ParseError::EmptyBundle {
                origin: "signing key bundle".to_string(),
            }
            .into());
        }
        debug!(keys = keys.len(), "signing bundle of signing keys");
        Ok(self.0.sign_raw(bundle))
    }

    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.0.verifying_key()
    }
}

/// A signing key: signs SHA-512 digests of artifacts in pre-hash mode.
#[derive(Debug)]
pub struct ArtifactSigner(Signer);

impl ArtifactSigner {
    /// # Errors
    /// See [`Signer::load`].
    pub async fn load(path: &Path) -> Result<Self, Error> {
        Signer::load(path).await.map(Self)
    }

    #[must_use]
    pub fn new(signer: Signer) -> Self {
        Self(signer)
    }

    /// Sign the SHA-512 digest of an artifact
    ///
    /// # Errors
    /// See [`Signer::sign_prehashed`].
    pub fn sign_artifact(&self, digest: &Sha512Digest) -> Result<Signature, Error> {
        self.0.sign_prehashed(digest)
    }

    /// Stream a file through SHA-512 and sign the result
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or signing fails.
    pub async fn sign_file(&self, path: &Path) -> Result<Signature, Error> {
        let digest = Sha512Digest::hash_file(path).await?;
        debug!(path = %path.display(), bytes = digest.len(), "signing artifact digest");
        self.sign_artifact(&digest)
    }

    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.0.verifying_key()
    }
}
