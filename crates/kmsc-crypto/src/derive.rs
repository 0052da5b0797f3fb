//! # Deterministic Key Derivation
//!
//! `derive_key(seed, key_name)`:
//!
//! 1. `mac = HMAC-SHA-256(key = seed, message = key_name)`
//! 2. `mac` (32 bytes) is the Ed25519 private key seed.
//! 3. The public key's `did:key` is the public identifier.
//!
//! No randomness and no network: identical `(secret, handle, key_name)`
//! always reproduces the identical key pair and identifier. Different key
//! names under one seed give independent identities.

use hmac::{Hmac, Mac};
use kmsc_core::Did;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::did_key::{did_key_for, fingerprint, verification_method_id};
use crate::ed25519::{Ed25519KeyPair, Ed25519PublicKey};
use crate::error::CryptoError;
use crate::seed::Seed;

/// Key name used when the caller does not choose one.
pub const DEFAULT_KEY_NAME: &str = "default";

/// Verification key type of every derived controller key.
pub const DERIVED_KEY_TYPE: &str = "Ed25519VerificationKey2018";

/// Output of [`derive_key`].
#[derive(Debug)]
pub struct DerivedKey {
    key_pair: Ed25519KeyPair,
    public_id: Did,
    verification_method: String,
}

impl DerivedKey {
    /// The derived key pair.
    pub fn key_pair(&self) -> &Ed25519KeyPair {
        &self.key_pair
    }

    /// Public key of the derived key pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.key_pair.public_key()
    }

    /// `did:key:<fingerprint>`.
    pub fn public_id(&self) -> &Did {
        &self.public_id
    }

    /// `did:key:<fingerprint>#<fingerprint>`.
    pub fn verification_method(&self) -> &str {
        &self.verification_method
    }

    /// Multibase fingerprint of the public key.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.key_pair.public_key())
    }

    /// Consume into the key pair.
    pub fn into_key_pair(self) -> Ed25519KeyPair {
        self.key_pair
    }
}

/// Derive the Ed25519 key pair named `key_name` from `seed`.
pub fn derive_key(seed: &Seed, key_name: &str) -> Result<DerivedKey, CryptoError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(seed.as_bytes())
        .map_err(|e| CryptoError::Derivation(e.to_string()))?;
    mac.update(key_name.as_bytes());
    let mut tag = Zeroizing::new([0u8; 32]);
    tag.copy_from_slice(&mac.finalize().into_bytes());

    let key_pair = Ed25519KeyPair::from_seed(&tag);
    let public_key = key_pair.public_key();
    Ok(DerivedKey {
        public_id: did_key_for(&public_key)?,
        verification_method: verification_method_id(&public_key),
        key_pair,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{salted_seed, Secret};
    use kmsc_core::Handle;

    fn alice_seed() -> Seed {
        salted_seed(&Secret::from("pw"), &Handle::from("alice"))
    }

    #[test]
    fn known_derivation_vectors() {
        let seed = alice_seed();
        let default = derive_key(&seed, DEFAULT_KEY_NAME).unwrap();
        assert_eq!(
            default.public_id().as_str(),
            "did:key:z6Mko6w8VaRmkSRuDw5LEY1ioucCx5LZWgucjomf251wmrBS"
        );
        let signing = derive_key(&seed, "signing").unwrap();
        assert_eq!(
            signing.public_id().as_str(),
            "did:key:z6Mku8pnDD3hs9mp77K2i2BXyTfJL7H3vSf9dc4ajQGDs92m"
        );
    }

    #[test]
    fn same_inputs_same_identity() {
        let a = derive_key(&alice_seed(), "default").unwrap();
        let b = derive_key(&alice_seed(), "default").unwrap();
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.verification_method(), b.verification_method());
    }

    #[test]
    fn key_name_separates_identities() {
        let a = derive_key(&alice_seed(), "default").unwrap();
        let b = derive_key(&alice_seed(), "root").unwrap();
        assert_ne!(a.public_id(), b.public_id());
    }

    #[test]
    fn verification_method_is_did_plus_fingerprint() {
        let k = derive_key(&alice_seed(), DEFAULT_KEY_NAME).unwrap();
        assert_eq!(
            k.verification_method(),
            format!("{}#{}", k.public_id(), k.fingerprint())
        );
        assert!(k.fingerprint().starts_with("z6Mk"));
    }

    #[test]
    fn derived_key_signs_verifiably() {
        let k = derive_key(&alice_seed(), DEFAULT_KEY_NAME).unwrap();
        let sig = k.key_pair().sign(b"payload");
        k.public_key().verify(b"payload", &sig).unwrap();
    }
}
