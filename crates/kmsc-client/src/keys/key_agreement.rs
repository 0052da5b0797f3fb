//! Key-agreement key held by the KMS.

use crate::error::KmsError;
use crate::operation::{
    decode_b64url, DeriveSecretOperation, DeriveSecretResponse, PublicKeyDescription,
};

use super::KeyRef;

/// Handle to a remote `X25519KeyAgreementKey2019`.
#[derive(Debug, Clone)]
pub struct KeyAgreementKey {
    key: KeyRef,
}

impl KeyAgreementKey {
    pub(crate) fn from_ref(key: KeyRef) -> Self {
        Self { key }
    }

    super::key_handle_accessors!();

    /// Derive the shared secret between this key and `public_key`.
    pub async fn derive_secret(
        &self,
        public_key: &PublicKeyDescription,
    ) -> Result<Vec<u8>, KmsError> {
        if public_key.public_key_base58.is_empty() {
            return Err(KmsError::InvalidInput("peer public key must not be empty".into()));
        }
        let body = DeriveSecretOperation::new(self.kms_id(), public_key);
        let resp: DeriveSecretResponse = self.key.post("deriveSecret", &body).await?;
        decode_b64url(&self.key.endpoint(), "secret", &resp.secret)
    }
}
