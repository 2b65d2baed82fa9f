//! The published bundle of current signing keys

use crate::encoding::{decode_public_key, encode_public_key};
use crate::mode::{verify_any, Message};
use distsign_errors::ParseError;
use distsign_hash::Sha512Digest;
use ed25519_dalek::{Signature, VerifyingKey};

/// Largest signing-key bundle a client will fetch (1 MiB)
pub const BUNDLE_SIZE_LIMIT: u64 = 1 << 20;

/// Decode a sequence of `PUBLIC KEY` blocks separated by whitespace.
///
/// An empty or whitespace-only input yields an empty vector; callers decide
/// whether that is acceptable.
///
/// # Errors
/// Returns [`ParseError::InvalidKey`] naming the zero-based index of the
/// first block that fails to decode.
pub fn parse_public_keys(raw: &[u8], origin: &str) -> Result<Vec<VerifyingKey>, ParseError> {
    let mut keys = Vec::new();
    let mut rest = raw.trim_ascii_start();

    while !rest.is_empty() {
        let (key, tail) = decode_public_key(rest).map_err(|reason| ParseError::InvalidKey {
            origin: origin.to_string(),
            index: keys.len(),
            reason,
        })?;
        keys.push(key);
        rest = tail.trim_ascii_start();
    }

    Ok(keys)
}

/// The set of signing keys currently authorized by a root key.
///
/// Never empty once constructed through [`SigningKeyBundle::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningKeyBundle {
    keys: Vec<VerifyingKey>,
}

impl SigningKeyBundle {
    /// Build a bundle from keys on the publishing side.
    ///
    /// # Errors
    /// Returns [`ParseError::EmptyBundle`] if `keys` is empty.
    pub fn new(keys: Vec<VerifyingKey>) -> Result<Self, ParseError> {
        if keys.is_empty() {
            return Err(ParseError::EmptyBundle {
                origin: "signing key bundle".to_string(),
            });
        }
        Ok(Self { keys })
    }

    /// Parse the bytes of `distsign.pub`. `origin` names where they came
    /// from and is used in error messages.
    ///
    /// # Errors
    /// Returns a [`ParseError`] if any block is malformed or no key is found.
    pub fn parse(raw: &[u8], origin: &str) -> Result<Self, ParseError> {
        let keys = parse_public_keys(raw, origin)?;
        if keys.is_empty() {
            return Err(ParseError::EmptyBundle {
                origin: origin.to_string(),
            });
        }
        Ok(Self { keys })
    }

    /// The exact bytes to publish as `distsign.pub` and sign with a root key
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        self.keys
            .iter()
            .map(encode_public_key)
            .collect::<String>()
            .into_bytes()
    }

    #[must_use]
    pub fn keys(&self) -> &[VerifyingKey] {
        &self.keys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Check an artifact digest against every key in the bundle, returning
    /// the position of the first key that validates it.
    #[must_use]
    pub fn verify_artifact(&self, digest: &Sha512Digest, signature: &Signature) -> Option<usize> {
        verify_any(&self.keys, &Message::Prehashed(digest), signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArtifactSigner, KeyPair, Signer};
    use distsign_errors::KeyEncodingError;

    fn bundle_of(pairs: &[KeyPair]) -> SigningKeyBundle {
        SigningKeyBundle::new(pairs.iter().map(KeyPair::public_key).collect()).unwrap()
    }

    #[test]
    fn test_encode_parse_preserves_order() {
        let pairs: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
        let bundle = bundle_of(&pairs);

        let parsed = SigningKeyBundle::parse(&bundle.encode(), "test").unwrap();
        assert_eq!(parsed, bundle);
        assert_eq!(parsed.len(), 3);
    }

    #[test]
    fn test_blank_lines_between_blocks() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        let raw = format!("{}\n{}\n\n", a.public_pem(), b.public_pem());

        let parsed = SigningKeyBundle::parse(raw.as_bytes(), "test").unwrap();
        assert_eq!(parsed.keys(), &[a.public_key(), b.public_key()]);
    }

    #[test]
    fn test_empty_bundle_rejected() {
        let inputs: [&[u8]; 3] = [b"", b"\n", b"  \r\n\t"];
        for raw in inputs {
            assert!(matches!(
                SigningKeyBundle::parse(raw, "https://example.com/distsign.pub"),
                Err(ParseError::EmptyBundle { .. })
            ));
        }
        assert!(SigningKeyBundle::new(Vec::new()).is_err());
    }

    #[test]
    fn test_malformed_block_reports_index() {
        let good = KeyPair::generate().public_pem();
        let raw = format!("{good}{}", KeyPair::generate().private_pem().as_str());

        match SigningKeyBundle::parse(raw.as_bytes(), "test").unwrap_err() {
            ParseError::InvalidKey { index, reason, .. } => {
                assert_eq!(index, 1);
                assert!(matches!(reason, KeyEncodingError::WrongTag { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let raw = format!("{}garbage", KeyPair::generate().public_pem());
        assert!(matches!(
            SigningKeyBundle::parse(raw.as_bytes(), "test"),
            Err(ParseError::InvalidKey {
                index: 1,
                reason: KeyEncodingError::NoBlock,
                ..
            })
        ));
    }

    #[test]
    fn test_verify_artifact_any_of() {
        let pairs: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
        let bundle = bundle_of(&pairs);
        let digest = Sha512Digest::from_data(b"release");

        for (i, pair) in pairs.iter().enumerate() {
            let sig = ArtifactSigner::new(Signer::from(pair))
                .sign_artifact(&digest)
                .unwrap();
            assert_eq!(bundle.verify_artifact(&digest, &sig), Some(i));
        }

        let outsider = ArtifactSigner::new(Signer::from(&KeyPair::generate()))
            .sign_artifact(&digest)
            .unwrap();
        assert_eq!(bundle.verify_artifact(&digest, &outsider), None);
    }
}
