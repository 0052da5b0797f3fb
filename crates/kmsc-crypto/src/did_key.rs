//! # did:key Fingerprints
//!
//! An Ed25519 public key is identified by its multibase fingerprint:
//! `'z'` (base58btc) followed by base58 of the multicodec header
//! `0xed 0x01` and the 32 raw key bytes. Every Ed25519 fingerprint therefore
//! starts with `z6Mk`.
//!
//! - `did:key:<fingerprint>` is the controller's public identifier.
//! - `did:key:<fingerprint>#<fingerprint>` is its verification method id, the
//!   value placed in `keyId` of an invocation signature.

use kmsc_core::Did;

use crate::ed25519::Ed25519PublicKey;
use crate::error::CryptoError;

/// Multicodec varint for `ed25519-pub`.
const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// Multibase prefix for base58btc.
const BASE58BTC_PREFIX: char = 'z';

/// Compute the multibase fingerprint of an Ed25519 public key.
pub fn fingerprint(public_key: &Ed25519PublicKey) -> String {
    let mut buf = Vec::with_capacity(ED25519_MULTICODEC.len() + 32);
    buf.extend_from_slice(&ED25519_MULTICODEC);
    buf.extend_from_slice(public_key.as_bytes());
    format!("{BASE58BTC_PREFIX}{}", bs58::encode(buf).into_string())
}

/// The `did:key` DID for an Ed25519 public key.
pub fn did_key_for(public_key: &Ed25519PublicKey) -> Result<Did, CryptoError> {
    let did = format!("did:key:{}", fingerprint(public_key));
    Did::new(did.clone()).map_err(|e| CryptoError::InvalidDidKey {
        did,
        reason: e.to_string(),
    })
}

/// The verification method id `did:key:<fp>#<fp>` for an Ed25519 public key.
pub fn verification_method_id(public_key: &Ed25519PublicKey) -> String {
    let fp = fingerprint(public_key);
    format!("did:key:{fp}#{fp}")
}

/// Recover the Ed25519 public key from a `did:key`.
///
/// Accepts a bare DID (`did:key:z6Mk...`), a verification method id
/// (`did:key:z6Mk...#z6Mk...`) or a bare fingerprint (`z6Mk...`).
pub fn public_key_from_did_key(value: &str) -> Result<Ed25519PublicKey, CryptoError> {
    let invalid = |reason: &str| CryptoError::InvalidDidKey {
        did: value.to_string(),
        reason: reason.to_string(),
    };

    let without_fragment = value.split_once('#').map_or(value, |(did, _)| did);
    let fp = without_fragment
        .strip_prefix("did:key:")
        .unwrap_or(without_fragment);
    let encoded = fp
        .strip_prefix(BASE58BTC_PREFIX)
        .ok_or_else(|| invalid("missing base58btc multibase prefix 'z'"))?;
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| invalid(&format!("base58 decode failed: {e}")))?;
    let key = bytes
        .strip_prefix(&ED25519_MULTICODEC)
        .ok_or_else(|| invalid("not an ed25519-pub multicodec key"))?;
    Ed25519PublicKey::from_slice(key).map_err(|e| invalid(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ed25519::Ed25519KeyPair;

    const RFC8032_PUBLIC: [u8; 32] = [
        0xd7, 0x5a, 0x98, 0x01, 0x82, 0xb1, 0x0a, 0xb7, 0xd5, 0x4b, 0xfe, 0xd3, 0xc9, 0x64,
        0x07, 0x3a, 0x0e, 0xe1, 0x72, 0xf3, 0xda, 0xa6, 0x23, 0x25, 0xaf, 0x02, 0x1a, 0x68,
        0xf7, 0x07, 0x51, 0x1a,
    ];

    #[test]
    fn rfc8032_fingerprint() {
        let pk = Ed25519PublicKey::from_bytes(RFC8032_PUBLIC);
        assert_eq!(
            fingerprint(&pk),
            "z6MktwupdmLXVVqTzCw4i46r4uGyosGXRnR3XjN4Zq7oMMsw"
        );
        assert_eq!(
            did_key_for(&pk).unwrap().as_str(),
            "did:key:z6MktwupdmLXVVqTzCw4i46r4uGyosGXRnR3XjN4Zq7oMMsw"
        );
    }

    #[test]
    fn verification_method_repeats_fingerprint() {
        let pk = Ed25519KeyPair::from_seed(&[3u8; 32]).public_key();
        let vm = verification_method_id(&pk);
        let (did, fragment) = vm.split_once('#').unwrap();
        assert_eq!(did, did_key_for(&pk).unwrap().as_str());
        assert_eq!(fragment, fingerprint(&pk));
    }

    #[test]
    fn decode_accepts_all_three_forms() {
        let pk = Ed25519KeyPair::from_seed(&[5u8; 32]).public_key();
        let fp = fingerprint(&pk);
        assert_eq!(public_key_from_did_key(&fp).unwrap(), pk);
        assert_eq!(public_key_from_did_key(&format!("did:key:{fp}")).unwrap(), pk);
        assert_eq!(
            public_key_from_did_key(&verification_method_id(&pk)).unwrap(),
            pk
        );
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(public_key_from_did_key("did:key:abc").is_err());
        assert!(public_key_from_did_key("did:key:z0OIl").is_err());
        // Valid base58 but wrong multicodec header (secp256k1-pub is 0xe7).
        let secp = format!("z{}", bs58::encode([0xe7, 0x01, 1, 2, 3]).into_string());
        assert!(public_key_from_did_key(&secp).is_err());
    }
}
