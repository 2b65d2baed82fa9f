#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Two-tier Ed25519 signing for distributable files
//!
//! Root keys sign the bundle of current signing keys; signing keys sign
//! individual files. Root public keys are compiled into the client, the
//! bundle is fetched fresh before every download.
//!
//! ```text
//! root keys -(raw)-> signing-key bundle -(prehash SHA-512)-> files
//! ```

mod bundle;
mod encoding;
mod keypair;
mod mode;
mod signer;
mod trust;

pub use bundle::{parse_public_keys, SigningKeyBundle, BUNDLE_SIZE_LIMIT};
pub use encoding::{
    decode_private_key, decode_public_key, encode_block, encode_public_key, key_id,
    PRIVATE_KEY_TAG, PUBLIC_KEY_TAG,
};
pub use keypair::KeyPair;
pub use mode::{verify, verify_any, HashAlgorithm, Message, SigningMode};
pub use signer::{ArtifactSigner, RootSigner, Signer};
pub use trust::TrustStore;

pub use ed25519_dalek::{
    Signature, VerifyingKey, KEYPAIR_LENGTH, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH,
};

/// Largest artifact a client will download (512 MiB)
pub const DOWNLOAD_SIZE_LIMIT: u64 = 1 << 29;
