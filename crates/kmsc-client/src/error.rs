//! KMS client error types.
//!
//! Input validation and invocation signing fail before any network I/O.
//! Remote failures are passed through as received; nothing here retries.

use kmsc_core::CanonicalizationError;
use kmsc_crypto::CryptoError;
use kmsc_zcap::InvocationError;

/// Errors from controller and key-handle operations.
#[derive(Debug, thiserror::Error)]
pub enum KmsError {
    /// A caller-supplied value has the wrong shape or type.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The key type is not one of the supported aliases.
    #[error("unknown key type {0:?}")]
    UnknownKeyType(String),

    /// The key version is neither `recommended` nor `fips`.
    #[error("unsupported key version {0:?}")]
    UnsupportedVersion(String),

    /// The invocation could not be authorized.
    #[error("invocation not authorized: {0}")]
    Invocation(#[from] InvocationError),

    /// Key derivation failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// The request body could not be canonicalized.
    #[error("request body serialization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The KMS returned a non-2xx status.
    #[error("KMS {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },

    /// A 2xx response that does not carry what the operation returns.
    #[error("unexpected response from {endpoint}: {reason}")]
    UnexpectedResponse { endpoint: String, reason: String },

    /// The acquisition path exists but has no implementation.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl KmsError {
    /// HTTP status of a remote rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
