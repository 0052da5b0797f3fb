//! Key-encryption key held by the KMS.

use crate::error::KmsError;
use crate::operation::{
    decode_b64url, UnwrapKeyOperation, UnwrapKeyResponse, WrapKeyOperation, WrapKeyResponse,
};

use super::KeyRef;

/// Handle to a remote `AesKeyWrappingKey2019`.
#[derive(Debug, Clone)]
pub struct Kek {
    key: KeyRef,
}

impl Kek {
    pub(crate) fn from_ref(key: KeyRef) -> Self {
        Self { key }
    }

    super::key_handle_accessors!();

    /// Wrap `unwrapped_key`, returning the wrapped key as the KMS encodes it.
    pub async fn wrap_key(&self, unwrapped_key: &[u8]) -> Result<String, KmsError> {
        if unwrapped_key.is_empty() {
            return Err(KmsError::InvalidInput("key to wrap must not be empty".into()));
        }
        let body = WrapKeyOperation::new(self.kms_id(), unwrapped_key);
        let resp: WrapKeyResponse = self.key.post("wrapKey", &body).await?;
        Ok(resp.wrapped_key)
    }

    /// Unwrap `wrapped_key`. `None` when the KMS could not unwrap it with
    /// this key.
    pub async fn unwrap_key(&self, wrapped_key: &str) -> Result<Option<Vec<u8>>, KmsError> {
        if wrapped_key.is_empty() {
            return Err(KmsError::InvalidInput("wrapped key must not be empty".into()));
        }
        let body = UnwrapKeyOperation::new(self.kms_id(), wrapped_key);
        let resp: UnwrapKeyResponse = self.key.post("unwrapKey", &body).await?;
        resp.unwrapped_key
            .map(|k| decode_b64url(&self.key.endpoint(), "unwrappedKey", &k))
            .transpose()
    }
}
