//! Ed25519 key pair generation

use crate::encoding::{encode_block, PRIVATE_KEY_TAG, PUBLIC_KEY_TAG};
use ed25519_dalek::{SigningKey, VerifyingKey, KEYPAIR_LENGTH, PUBLIC_KEY_LENGTH};
use rand::rngs::OsRng;
use std::fmt;
use zeroize::Zeroizing;

/// A freshly generated key pair.
///
/// Nothing is persisted; the caller decides where each half is stored.
/// Root key pairs are meant to be kept offline, signing key pairs online.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a key pair from the operating system's CSPRNG.
    ///
    /// # Panics
    /// Panics if the OS entropy source fails; there is no safe fallback.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// The 64-byte private key (seed followed by public key)
    #[must_use]
    pub fn private_key(&self) -> Zeroizing<[u8; KEYPAIR_LENGTH]> {
        Zeroizing::new(self.signing_key.to_keypair_bytes())
    }

    /// The 32-byte public key
    #[must_use]
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.signing_key.verifying_key().to_bytes()
    }

    #[must_use]
    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// The private half as a `PRIVATE KEY` block
    #[must_use]
    pub fn private_pem(&self) -> Zeroizing<String> {
        Zeroizing::new(encode_block(PRIVATE_KEY_TAG, &*self.private_key()))
    }

    /// The public half as a `PUBLIC KEY` block
    #[must_use]
    pub fn public_pem(&self) -> String {
        encode_block(PUBLIC_KEY_TAG, &self.public_key_bytes())
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.public_key_bytes()))
            .finish_non_exhaustive()
    }
}
