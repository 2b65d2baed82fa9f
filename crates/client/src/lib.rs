#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Download files from a distsign server and verify their signatures
//!
//! A server publishes:
//!
//! ```text
//! distsign.pub        signing keys, newline-joined PUBLIC KEY blocks
//! distsign.pub.sig    root-key signature over distsign.pub (raw Ed25519)
//! <path>              any distributable file
//! <path>.sig          signing-key signature over SHA-512(<path>) (Ed25519ph)
//! ```

mod client;

pub use client::{Client, VerifiedDownload, BUNDLE_PATH, SIGNATURE_SUFFIX};

pub use distsign_net::{CancellationToken, FetchOptions, NetClient, NetConfig};
pub use distsign_signing::{SigningKeyBundle, TrustStore};
