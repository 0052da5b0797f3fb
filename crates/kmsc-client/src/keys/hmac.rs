//! HMAC-SHA-256 key held by the KMS.

use crate::error::KmsError;
use crate::operation::{decode_b64url, SignOperation, SignResponse, VerifyOperation, VerifyResponse};

use super::KeyRef;

/// Handle to a remote `Sha256HmacKey2019`.
#[derive(Debug, Clone)]
pub struct Hmac {
    key: KeyRef,
}

impl Hmac {
    pub(crate) fn from_ref(key: KeyRef) -> Self {
        Self { key }
    }

    super::key_handle_accessors!();

    /// MAC `data` with the remote key.
    pub async fn sign(&self, data: &[u8]) -> Result<Vec<u8>, KmsError> {
        let body = SignOperation::new(self.kms_id(), data);
        let resp: SignResponse = self.key.post("sign", &body).await?;
        decode_b64url(&self.key.endpoint(), "signatureValue", &resp.signature_value)
    }

    /// Ask the KMS whether `signature` is the MAC of `data`.
    pub async fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool, KmsError> {
        let body = VerifyOperation::new(self.kms_id(), data, signature);
        let resp: VerifyResponse = self.key.post("verify", &body).await?;
        Ok(resp.verified)
    }
}
