//! Root public keys the client trusts unconditionally

use crate::bundle::parse_public_keys;
use crate::encoding::key_id;
use crate::mode::{verify_any, Message};
use distsign_errors::{Error, TrustError};
use ed25519_dalek::{Signature, VerifyingKey};
use tracing::{debug, warn};

/// Root keys compiled into every client. Rotating them requires a new
/// client release; keeping several lets one be retired without breaking
/// clients that have not upgraded past it.
const EMBEDDED_ROOTS: &[(&str, &str)] = &[
    (
        "distsign-root-1.pem",
        include_str!("../roots/distsign-root-1.pem"),
    ),
    (
        "distsign-root-2.pem",
        include_str!("../roots/distsign-root-2.pem"),
    ),
];

/// Ordered, non-empty, immutable set of root public keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustStore {
    roots: Vec<VerifyingKey>,
}

impl TrustStore {
    /// # Errors
    /// Returns [`TrustError::EmptyTrustStore`] if `roots` is empty.
    pub fn new(roots: Vec<VerifyingKey>) -> Result<Self, TrustError> {
        if roots.is_empty() {
            return Err(TrustError::EmptyTrustStore);
        }
        Ok(Self { roots })
    }

    /// Build a store from newline-joined `PUBLIC KEY` blocks
    ///
    /// # Errors
    /// Returns a parse error for a malformed block and
    /// [`TrustError::EmptyTrustStore`] if no key is present.
    pub fn from_pem(data: &[u8], origin: &str) -> Result<Self, Error> {
        let roots = parse_public_keys(data, origin)?;
        Ok(Self::new(roots)?)
    }

    /// The root keys compiled into this build
    ///
    /// # Errors
    /// Returns an error only if an embedded key file is malformed.
    pub fn embedded() -> Result<Self, Error> {
        let mut roots = Vec::with_capacity(EMBEDDED_ROOTS.len());
        for (name, pem) in EMBEDDED_ROOTS {
            roots.extend(parse_public_keys(pem.as_bytes(), name)?);
        }
        Ok(Self::new(roots)?)
    }

    #[must_use]
    pub fn roots(&self) -> &[VerifyingKey] {
        &self.roots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Always false for a constructed store
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// True iff any root key validates `signature` over the exact bundle
    /// bytes in raw mode.
    #[must_use]
    pub fn verify_bundle(&self, bundle: &[u8], signature: &Signature) -> bool {
        match verify_any(&self.roots, &Message::Raw(bundle), signature) {
            Some(index) => {
                debug!(
                    root = %key_id(&self.roots[index]),
                    bytes = bundle.len(),
                    "signing key bundle validated by root key"
                );
                true
            }
            None => {
                warn!(
                    roots = self.roots.len(),
                    bytes = bundle.len(),
                    "signing key bundle does not validate with any root key"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeyPair, RootSigner, Signer, SigningKeyBundle};

    #[test]
    fn test_embedded_roots_parse() {
        let store = TrustStore::embedded().unwrap();
        assert_eq!(store.len(), EMBEDDED_ROOTS.len());
    }

    #[test]
    fn test_empty_store_rejected() {
        assert!(matches!(
            TrustStore::new(Vec::new()),
            Err(TrustError::EmptyTrustStore)
        ));
        assert!(matches!(
            TrustStore::from_pem(b"\n", "roots.pem"),
            Err(Error::Trust(TrustError::EmptyTrustStore))
        ));
    }

    #[test]
    fn test_verify_bundle_any_root() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        let store = TrustStore::new(vec![a.public_key(), b.public_key()]).unwrap();

        let bundle = SigningKeyBundle::new(vec![KeyPair::generate().public_key()])
            .unwrap()
            .encode();
        let sig = RootSigner::new(Signer::from(&b))
            .sign_signing_keys(&bundle)
            .unwrap();

        assert!(store.verify_bundle(&bundle, &sig));

        let mut tampered = bundle.clone();
        tampered[40] ^= 0x01;
        assert!(!store.verify_bundle(&tampered, &sig));
    }

    #[test]
    fn test_from_pem_preserves_order() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        let text = format!("{}{}", a.public_pem(), b.public_pem());

        let store = TrustStore::from_pem(text.as_bytes(), "roots.pem").unwrap();
        assert_eq!(store.roots(), &[a.public_key(), b.public_key()]);
    }
}
