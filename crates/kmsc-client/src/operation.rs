//! Request and response bodies of the KMS key operations.
//!
//! | Operation | Body `type` | Result field |
//! |-----------|-------------|--------------|
//! | generate key | `GenerateKeyOperation` | key description |
//! | sign | `SignOperation` | `signatureValue` |
//! | verify | `VerifyOperation` | `verified` |
//! | wrap key | `WrapKeyOperation` | `wrappedKey` |
//! | unwrap key | `UnwrapKeyOperation` | `unwrappedKey` (nullable) |
//! | derive secret | `DeriveSecretOperation` | `secret` |
//!
//! Binary values travel as base64url without padding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::KmsError;

/// JSON-LD context of every operation body.
pub const SECURITY_CONTEXT: &str = "https://w3id.org/security/v2";

// -- Requests -----------------------------------------------------------------

/// Key to create: its type and the controller that will own it.
#[derive(Debug, Serialize)]
pub struct GenerateKeyTarget<'a> {
    #[serde(rename = "type")]
    pub key_type: &'a str,
    pub controller: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateKeyOperation<'a> {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "type")]
    pub operation_type: &'static str,
    pub invocation_target: GenerateKeyTarget<'a>,
    pub kms_module: &'a str,
}

impl<'a> GenerateKeyOperation<'a> {
    pub fn new(key_type: &'a str, controller: &'a str, kms_module: &'a str) -> Self {
        Self {
            context: SECURITY_CONTEXT,
            operation_type: "GenerateKeyOperation",
            invocation_target: GenerateKeyTarget {
                key_type,
                controller,
            },
            kms_module,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOperation<'a> {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "type")]
    pub operation_type: &'static str,
    pub invocation_target: &'a str,
    pub verify_data: String,
}

impl<'a> SignOperation<'a> {
    pub fn new(invocation_target: &'a str, data: &[u8]) -> Self {
        Self {
            context: SECURITY_CONTEXT,
            operation_type: "SignOperation",
            invocation_target,
            verify_data: encode_b64url(data),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOperation<'a> {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "type")]
    pub operation_type: &'static str,
    pub invocation_target: &'a str,
    pub verify_data: String,
    pub signature_value: String,
}

impl<'a> VerifyOperation<'a> {
    pub fn new(invocation_target: &'a str, data: &[u8], signature: &[u8]) -> Self {
        Self {
            context: SECURITY_CONTEXT,
            operation_type: "VerifyOperation",
            invocation_target,
            verify_data: encode_b64url(data),
            signature_value: encode_b64url(signature),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WrapKeyOperation<'a> {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "type")]
    pub operation_type: &'static str,
    pub invocation_target: &'a str,
    pub unwrapped_key: String,
}

impl<'a> WrapKeyOperation<'a> {
    pub fn new(invocation_target: &'a str, unwrapped_key: &[u8]) -> Self {
        Self {
            context: SECURITY_CONTEXT,
            operation_type: "WrapKeyOperation",
            invocation_target,
            unwrapped_key: encode_b64url(unwrapped_key),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnwrapKeyOperation<'a> {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "type")]
    pub operation_type: &'static str,
    pub invocation_target: &'a str,
    pub wrapped_key: &'a str,
}

impl<'a> UnwrapKeyOperation<'a> {
    pub fn new(invocation_target: &'a str, wrapped_key: &'a str) -> Self {
        Self {
            context: SECURITY_CONTEXT,
            operation_type: "UnwrapKeyOperation",
            invocation_target,
            wrapped_key,
        }
    }
}

/// The peer public key of a key agreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyDescription {
    #[serde(rename = "type")]
    pub key_type: String,
    pub public_key_base58: String,
}

impl PublicKeyDescription {
    /// An X25519 key-agreement public key.
    pub fn x25519(public_key_base58: impl Into<String>) -> Self {
        Self {
            key_type: "X25519KeyAgreementKey2019".to_string(),
            public_key_base58: public_key_base58.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeriveSecretOperation<'a> {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "type")]
    pub operation_type: &'static str,
    pub invocation_target: &'a str,
    pub public_key: &'a PublicKeyDescription,
}

impl<'a> DeriveSecretOperation<'a> {
    pub fn new(invocation_target: &'a str, public_key: &'a PublicKeyDescription) -> Self {
        Self {
            context: SECURITY_CONTEXT,
            operation_type: "DeriveSecretOperation",
            invocation_target,
            public_key,
        }
    }
}

// -- Responses ----------------------------------------------------------------

/// A key as described by the KMS.
///
/// Fields the client does not interpret are kept in `extra`;
/// `deny_unknown_fields` is intentionally not used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyDescription {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub signature_value: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyResponse {
    pub verified: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrapKeyResponse {
    pub wrapped_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnwrapKeyResponse {
    #[serde(default)]
    pub unwrapped_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeriveSecretResponse {
    pub secret: String,
}

// -- Encoding -----------------------------------------------------------------

/// base64url without padding.
pub fn encode_b64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode a base64url result field returned by `endpoint`.
pub fn decode_b64url(endpoint: &str, field: &str, value: &str) -> Result<Vec<u8>, KmsError> {
    URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|e| KmsError::UnexpectedResponse {
            endpoint: endpoint.to_string(),
            reason: format!("{field} is not base64url: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KEY: &str = "https://kms.example.com/keystores/z1/keys/k1";

    #[test]
    fn generate_key_body_shape() {
        let body = GenerateKeyOperation::new(
            "Sha256HmacKey2019",
            "did:key:z6Mko6w8VaRmkSRuDw5LEY1ioucCx5LZWgucjomf251wmrBS",
            "ssm-v1",
        );
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "@context": "https://w3id.org/security/v2",
                "type": "GenerateKeyOperation",
                "invocationTarget": {
                    "type": "Sha256HmacKey2019",
                    "controller": "did:key:z6Mko6w8VaRmkSRuDw5LEY1ioucCx5LZWgucjomf251wmrBS"
                },
                "kmsModule": "ssm-v1"
            })
        );
    }

    #[test]
    fn sign_body_encodes_data_as_b64url() {
        let body = SignOperation::new(KEY, b"hello");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "@context": "https://w3id.org/security/v2",
                "type": "SignOperation",
                "invocationTarget": KEY,
                "verifyData": "aGVsbG8"
            })
        );
    }

    #[test]
    fn verify_body_carries_signature() {
        let body = VerifyOperation::new(KEY, b"hello", &[0xfb, 0xff]);
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["type"], "VerifyOperation");
        assert_eq!(v["signatureValue"], "-_8");
    }

    #[test]
    fn derive_secret_body_nests_public_key() {
        let pk = PublicKeyDescription::x25519("8pM1DN3RiT8vbom5u1sNryaNT1nyL8CTTW3b5PwWXRBH");
        let v = serde_json::to_value(DeriveSecretOperation::new(KEY, &pk)).unwrap();
        assert_eq!(v["publicKey"]["type"], "X25519KeyAgreementKey2019");
        assert_eq!(
            v["publicKey"]["publicKeyBase58"],
            "8pM1DN3RiT8vbom5u1sNryaNT1nyL8CTTW3b5PwWXRBH"
        );
    }

    #[test]
    fn unwrap_response_allows_null() {
        let r: UnwrapKeyResponse = serde_json::from_value(json!({"unwrappedKey": null})).unwrap();
        assert!(r.unwrapped_key.is_none());
        let r: UnwrapKeyResponse = serde_json::from_value(json!({})).unwrap();
        assert!(r.unwrapped_key.is_none());
    }

    #[test]
    fn key_description_keeps_extra_fields() {
        let d: KeyDescription = serde_json::from_value(json!({
            "@context": "https://w3id.org/security/v2",
            "id": KEY,
            "type": "Sha256HmacKey2019",
            "kmsModule": "ssm-v1"
        }))
        .unwrap();
        assert_eq!(d.key_type.as_deref(), Some("Sha256HmacKey2019"));
        assert_eq!(d.extra["kmsModule"], "ssm-v1");
    }

    #[test]
    fn bad_base64url_is_unexpected_response() {
        let err = decode_b64url("POST k1", "signatureValue", "not*base64").unwrap_err();
        assert!(matches!(err, KmsError::UnexpectedResponse { .. }));
        assert_eq!(decode_b64url("e", "f", "aGVsbG8").unwrap(), b"hello");
    }
}
