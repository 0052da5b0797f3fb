//! # Error Types
//!
//! Errors raised by the foundational types. Higher layers wrap these with
//! `#[from]` so callers see a single error enum per crate.

use thiserror::Error;

/// Error during canonical serialization of a request body.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// A value failed validation at construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The string is not a `did:method:identifier`.
    #[error("invalid DID: {0:?}")]
    InvalidDid(String),

    /// The Unix timestamp is outside the representable range.
    #[error("invalid Unix timestamp: {0}")]
    InvalidTimestamp(i64),
}
