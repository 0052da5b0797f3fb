//! # Invocation Signers
//!
//! Anything that can sign a capability invocation: the local controller key,
//! or a delegate whose signing happens elsewhere. Signing is async because a
//! delegated signer may itself be a remote call.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SignerError;

/// A signer of capability invocations.
///
/// `id` is the verification method that the remote service resolves to a
/// public key; it becomes the `keyId` of the HTTP signature.
#[async_trait]
pub trait InvocationSigner: Send + Sync {
    /// Verification method id, e.g. `did:key:z6Mk...#z6Mk...`.
    fn id(&self) -> &str;

    /// Verification key type, e.g. `Ed25519VerificationKey2018`.
    fn key_type(&self) -> &str;

    /// Sign `data`, returning raw signature bytes.
    async fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SignerError>;
}

#[async_trait]
impl<T: InvocationSigner + ?Sized> InvocationSigner for Arc<T> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn key_type(&self) -> &str {
        (**self).key_type()
    }

    async fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SignerError> {
        (**self).sign(data).await
    }
}
