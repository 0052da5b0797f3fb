//! Asymmetric signing key held by the KMS.

use crate::error::KmsError;
use crate::operation::{decode_b64url, SignOperation, SignResponse, VerifyOperation, VerifyResponse};

use super::KeyRef;

/// Handle to a remote `Ed25519VerificationKey2018`.
///
/// Signing happens in the KMS. The public half can be read from
/// [`describe`](Self::describe) and checked locally.
#[derive(Debug, Clone)]
pub struct AsymmetricKey {
    key: KeyRef,
}

impl AsymmetricKey {
    pub(crate) fn from_ref(key: KeyRef) -> Self {
        Self { key }
    }

    super::key_handle_accessors!();

    pub async fn sign(&self, data: &[u8]) -> Result<Vec<u8>, KmsError> {
        let body = SignOperation::new(self.kms_id(), data);
        let resp: SignResponse = self.key.post("sign", &body).await?;
        decode_b64url(&self.key.endpoint(), "signatureValue", &resp.signature_value)
    }

    pub async fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool, KmsError> {
        let body = VerifyOperation::new(self.kms_id(), data, signature);
        let resp: VerifyResponse = self.key.post("verify", &body).await?;
        Ok(resp.verified)
    }
}
