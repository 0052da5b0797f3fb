//! # Invocation Error Types
//!
//! Every variant here is raised before a request leaves the process. An
//! invocation that cannot be fully signed is never sent unsigned.

use thiserror::Error;

/// Failure reported by an [`InvocationSigner`](crate::InvocationSigner).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct SignerError(pub String);

impl SignerError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Errors from building or parsing a capability invocation.
#[derive(Error, Debug)]
pub enum InvocationError {
    /// The signer has no usable id or type.
    #[error("invocation signer is missing its {0}")]
    MissingSigner(&'static str),

    /// The key the invocation targets has no id.
    #[error("invocation target is missing")]
    MissingTarget,

    /// No capability action was named.
    #[error("capability action is missing")]
    MissingAction,

    /// A supplied capability has no id.
    #[error("capability has no id")]
    InvalidCapability,

    /// A value would break out of its quoted header parameter.
    #[error("{param} {value:?} contains a quote, backslash or control character")]
    UnquotableParameter { param: &'static str, value: String },

    /// The request URL cannot carry an HTTP signature.
    #[error("invalid invocation URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The validity window cannot be represented.
    #[error("invocation expiry overflows the timestamp range")]
    ExpiryOverflow,

    /// The signer refused or failed to sign.
    #[error("signer {signer} rejected the invocation: {source}")]
    SignerRejected {
        signer: String,
        #[source]
        source: SignerError,
    },

    /// A header named in the signature is absent.
    #[error("covered header {0:?} is missing")]
    MissingHeader(String),

    /// An `authorization` or `capability-invocation` header did not parse.
    #[error("malformed {header} header: {reason}")]
    MalformedHeader {
        header: &'static str,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signer_rejected_display_names_signer() {
        let err = InvocationError::SignerRejected {
            signer: "did:key:z6Mk#z6Mk".into(),
            source: SignerError::new("hardware token removed"),
        };
        let msg = err.to_string();
        assert!(msg.contains("did:key:z6Mk#z6Mk"));
        assert!(msg.contains("hardware token removed"));
    }

    #[test]
    fn missing_signer_display() {
        assert_eq!(
            InvocationError::MissingSigner("id").to_string(),
            "invocation signer is missing its id"
        );
    }
}
