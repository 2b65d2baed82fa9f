//! PEM-style text encoding of raw Ed25519 keys
//!
//! Each key is a single `-----BEGIN <TAG>-----` block whose body is the raw
//! key bytes. Private keys are 64 bytes (seed followed by public key),
//! public keys are 32 bytes.

use distsign_errors::KeyEncodingError;
use ed25519_dalek::{VerifyingKey, KEYPAIR_LENGTH, PUBLIC_KEY_LENGTH};
use pem::{EncodeConfig, LineEnding, Pem};
use zeroize::Zeroizing;

pub const PRIVATE_KEY_TAG: &str = "PRIVATE KEY";
pub const PUBLIC_KEY_TAG: &str = "PUBLIC KEY";

const END_MARKER: &[u8] = b"-----END ";
const DASHES: &[u8] = b"-----";

/// Encode bytes as a single tagged block with `\n` line endings
#[must_use]
pub fn encode_block(tag: &str, contents: &[u8]) -> String {
    let block = Pem::new(tag, contents.to_vec());
    pem::encode_config(&block, EncodeConfig::new().set_line_ending(LineEnding::LF))
}

/// Encode a public key as a `PUBLIC KEY` block
#[must_use]
pub fn encode_public_key(key: &VerifyingKey) -> String {
    encode_block(PUBLIC_KEY_TAG, key.as_bytes())
}

/// Short stable identifier for a public key, used in logs and CLI output
#[must_use]
pub fn key_id(key: &VerifyingKey) -> String {
    hex::encode(&key.as_bytes()[..8])
}

/// Decode a private key file: exactly one `PRIVATE KEY` block of 64 bytes.
///
/// # Errors
/// Returns an error if no block is found, anything follows the block's
/// closing line ending, the tag is wrong, or the body has the wrong length.
pub fn decode_private_key(
    data: &[u8],
) -> Result<Zeroizing<[u8; KEYPAIR_LENGTH]>, KeyEncodingError> {
    let (block, rest) = decode_block(data)?;
    if !rest.is_empty() {
        return Err(KeyEncodingError::TrailingData);
    }
    check_tag(&block, PRIVATE_KEY_TAG)?;

    let contents = Zeroizing::new(block.into_contents());
    let mut bytes = Zeroizing::new([0u8; KEYPAIR_LENGTH]);
    if contents.len() != KEYPAIR_LENGTH {
        return Err(KeyEncodingError::WrongLength {
            tag: PRIVATE_KEY_TAG.to_string(),
            expected: KEYPAIR_LENGTH,
            actual: contents.len(),
        });
    }
    bytes.copy_from_slice(&contents);
    Ok(bytes)
}

/// Decode the first `PUBLIC KEY` block in `data`, returning the key and
/// the bytes following the block.
///
/// # Errors
/// Returns an error if no block is found, the tag is wrong, the body is
/// not 32 bytes, or the bytes are not a valid curve point.
pub fn decode_public_key(data: &[u8]) -> Result<(VerifyingKey, &[u8]), KeyEncodingError> {
    let (block, rest) = decode_block(data)?;
    check_tag(&block, PUBLIC_KEY_TAG)?;

    let bytes: [u8; PUBLIC_KEY_LENGTH] =
        block
            .contents()
            .try_into()
            .map_err(|_| KeyEncodingError::WrongLength {
                tag: PUBLIC_KEY_TAG.to_string(),
                expected: PUBLIC_KEY_LENGTH,
                actual: block.contents().len(),
            })?;
    let key = VerifyingKey::from_bytes(&bytes).map_err(|e| KeyEncodingError::InvalidKey {
        message: e.to_string(),
    })?;
    Ok((key, rest))
}

fn check_tag(block: &Pem, expected: &str) -> Result<(), KeyEncodingError> {
    if block.tag() == expected {
        Ok(())
    } else {
        Err(KeyEncodingError::WrongTag {
            expected: expected.to_string(),
            found: block.tag().to_string(),
        })
    }
}

fn decode_block(data: &[u8]) -> Result<(Pem, &[u8]), KeyEncodingError> {
    let (head, rest) = split_first_block(data).ok_or(KeyEncodingError::NoBlock)?;
    let block = pem::parse(head).map_err(|e| KeyEncodingError::Malformed {
        message: e.to_string(),
    })?;
    Ok((block, rest))
}

/// Split `data` after the end line of its first block. One line ending
/// after the closing dashes belongs to the block.
fn split_first_block(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let end = find(data, END_MARKER)? + END_MARKER.len();
    let close = end + find(&data[end..], DASHES)? + DASHES.len();

    let mut rest = &data[close..];
    rest = rest.strip_prefix(b"\r").unwrap_or(rest);
    rest = rest.strip_prefix(b"\n").unwrap_or(rest);
    Some((&data[..close], rest))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
