//! # Cryptographic Error Types
//!
//! Structured errors for derivation, encoding and verification in
//! `kmsc-crypto`.

use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Ed25519 signature verification failed.
    #[error("Ed25519 verification failed: {0}")]
    VerificationFailed(String),

    /// Invalid Ed25519 signature length.
    #[error("invalid Ed25519 signature length: expected 64 bytes, got {0}")]
    InvalidSignatureLength(usize),

    /// Invalid Ed25519 public key.
    #[error("invalid Ed25519 public key: {0}")]
    InvalidPublicKey(String),

    /// The string is not a decodable Ed25519 `did:key`.
    #[error("invalid did:key {did:?}: {reason}")]
    InvalidDidKey { did: String, reason: String },

    /// The HMAC primitive refused the seed as a key.
    #[error("key derivation failed: {0}")]
    Derivation(String),
}
