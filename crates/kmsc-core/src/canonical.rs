//! # Canonical Serialization — JCS Request Bodies
//!
//! Defines `CanonicalBytes`, the only construction path for bytes sent as a
//! JSON request body to the remote KMS.
//!
//! ## Security Invariant
//!
//! An invocation signature binds the `digest` header, and the digest is
//! computed over the body. If the body were serialized twice (once for the
//! digest, once for the wire) with different key orders, the remote service
//! would reject the invocation. `CanonicalBytes` has a private inner field and
//! a single constructor, so the digested bytes and the sent bytes are the same
//! value by construction.
//!
//! Serialization uses `serde_jcs` for RFC 8785 (JSON Canonicalization
//! Scheme) output: sorted keys, compact separators, deterministic bytes.

use serde::Serialize;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - Object keys are sorted, separators are compact, output is UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value cannot
    /// be represented as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the owned byte vector (used as the HTTP body).
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
