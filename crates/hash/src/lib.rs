#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! SHA-512 digests for distsign
//!
//! Artifacts are signed in pre-hashed mode, so the signer and the client
//! both need the running SHA-512 state rather than just the final bytes.
//! [`Sha512Digest`] keeps that state; [`Hash`] is the finished value used
//! for display and comparison.

use distsign_errors::Error;
use sha2::{Digest, Sha512};
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Size of chunks for streaming hash computation
const CHUNK_SIZE: usize = 64 * 1024; // 64KB

/// Length of a SHA-512 output in bytes
pub const HASH_LENGTH: usize = 64;

/// A finished SHA-512 value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hash {
    bytes: [u8; HASH_LENGTH],
}

impl Hash {
    /// Create a hash from raw bytes
    #[must_use]
    pub fn from_bytes(bytes: [u8; HASH_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Get the raw bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.bytes
    }

    /// Convert to hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A running SHA-512 accumulator together with the number of bytes fed in.
///
/// This is the message representation consumed by Ed25519ph signing and
/// verification. Cloning is cheap and does not disturb the running state.
#[derive(Clone, Default)]
pub struct Sha512Digest {
    state: Sha512,
    len: u64,
}

impl Sha512Digest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed more bytes into the digest
    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
        self.len += data.len() as u64;
    }

    /// Number of bytes hashed so far
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The SHA-512 value of everything hashed so far
    #[must_use]
    pub fn hash(&self) -> Hash {
        let mut bytes = [0u8; HASH_LENGTH];
        bytes.copy_from_slice(&self.state.clone().finalize());
        Hash::from_bytes(bytes)
    }

    /// A copy of the underlying hasher, ready to be finalized by a
    /// pre-hash signature scheme
    #[must_use]
    pub fn state(&self) -> Sha512 {
        self.state.clone()
    }

    /// Compute the digest of a byte slice
    #[must_use]
    pub fn from_data(data: &[u8]) -> Self {
        let mut digest = Self::new();
        digest.update(data);
        digest
    }

    /// Compute the digest of a file without buffering it
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or read.
    pub async fn hash_file(path: &Path) -> Result<Self, Error> {
        let mut file = File::open(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;

        let mut digest = Self::new();
        let mut buffer = vec![0; CHUNK_SIZE];

        loop {
            let n = file
                .read(&mut buffer)
                .await
                .map_err(|e| Error::io_with_path(&e, path))?;
            if n == 0 {
                break;
            }
            digest.update(&buffer[..n]);
        }

        Ok(digest)
    }
}

impl fmt::Debug for Sha512Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sha512Digest")
            .field("len", &self.len)
            .field("hash", &self.hash().to_hex())
            .finish()
    }
}

impl PartialEq for Sha512Digest {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.hash() == other.hash()
    }
}

impl Eq for Sha512Digest {}
