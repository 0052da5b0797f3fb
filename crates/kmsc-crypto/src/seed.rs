//! # Salted-Hash Seeds
//!
//! A controller seed is `SHA-256(urlEncode(handle) + ":" + urlEncode(secret))`.
//! The handle salts the hash so the same password under two accounts yields
//! two unrelated controllers.
//!
//! `urlEncode` percent-encodes every byte outside `A-Z a-z 0-9 - _ . ~`.
//! Encoding is applied to bytes, so a string secret and its UTF-8 bytes
//! produce the same seed.

use kmsc_core::{sha256_raw, Handle};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Opaque secret supplied by the application (a password hash, for example).
///
/// Never persisted by this crate. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret(Vec<u8>);

impl Secret {
    /// Wrap raw secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Access the secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl From<&[u8]> for Secret {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl From<Vec<u8>> for Secret {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// 32-byte deterministic seed derived from a secret and a handle.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; 32]);

impl Seed {
    /// Wrap raw seed bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Access the raw seed bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}

/// Compute the salted seed for `(secret, handle)`.
///
/// Hashes `enc(handle) ":" enc(secret)`, where `enc` percent-encodes every
/// byte outside `A-Z a-z 0-9 - _ . ~`. That includes `! * ' ( )`, so `enc`
/// is not `encodeURIComponent`-compatible and seeds differ from one derived
/// with it whenever those characters appear.
pub fn salted_seed(secret: &Secret, handle: &Handle) -> Seed {
    let mut input = Zeroizing::new(String::new());
    input.push_str(&urlencoding::encode_binary(handle.as_str().as_bytes()));
    input.push(':');
    input.push_str(&urlencoding::encode_binary(secret.as_bytes()));
    Seed(sha256_raw(input.as_bytes()))
}
