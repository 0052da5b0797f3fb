//! # Key Handles
//!
//! Typed references to keys that live in the remote KMS. A handle carries
//! the key's id, the URL operations are sent to (`kms_id`, defaulting to the
//! id), an optional delegated capability, and the signer that authorizes
//! invocations. It never holds key material.
//!
//! | Handle | Type string | Operations |
//! |--------|-------------|------------|
//! | [`Hmac`] | `Sha256HmacKey2019` | sign, verify |
//! | [`Kek`] | `AesKeyWrappingKey2019` | wrap, unwrap |
//! | [`AsymmetricKey`] | `Ed25519VerificationKey2018` | sign, verify |
//! | [`KeyAgreementKey`] | `X25519KeyAgreementKey2019` | derive secret |
//!
//! Every handle can also fetch its key description.

mod asymmetric;
mod hmac;
mod kek;
mod key_agreement;

pub use asymmetric::AsymmetricKey;
pub use hmac::Hmac;
pub use kek::Kek;
pub use key_agreement::KeyAgreementKey;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use kmsc_core::CanonicalBytes;
use kmsc_zcap::{Capability, InvocationSigner};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{KmsCall, KmsClient};
use crate::error::KmsError;
use crate::operation::KeyDescription;

// -- Key types ----------------------------------------------------------------

/// The four kinds of remote key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Hmac,
    Kek,
    Asymmetric,
    KeyAgreement,
}

impl KeyType {
    /// Map a type name or alias to a key type.
    ///
    /// Accepts `hmac`, `kek`, `Ed25519VerificationKey2018`, `keyAgreement`
    /// and each canonical type string.
    pub fn parse(name: &str) -> Result<Self, KmsError> {
        match name {
            "hmac" | "Sha256HmacKey2019" => Ok(Self::Hmac),
            "kek" | "AesKeyWrappingKey2019" => Ok(Self::Kek),
            "Ed25519VerificationKey2018" => Ok(Self::Asymmetric),
            "keyAgreement" | "X25519KeyAgreementKey2019" => Ok(Self::KeyAgreement),
            other => Err(KmsError::UnknownKeyType(other.to_string())),
        }
    }

    /// Canonical type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hmac => "Sha256HmacKey2019",
            Self::Kek => "AesKeyWrappingKey2019",
            Self::Asymmetric => "Ed25519VerificationKey2018",
            Self::KeyAgreement => "X25519KeyAgreementKey2019",
        }
    }

    /// Type string to request for `version`.
    // FIPS shares the recommended suite until a FIPS-approved one is chosen.
    pub fn type_for_version(&self, version: KeyVersion) -> &'static str {
        match version {
            KeyVersion::Recommended | KeyVersion::Fips => self.as_str(),
        }
    }
}

impl FromStr for KeyType {
    type Err = KmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Algorithm suite of a generated key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyVersion {
    #[default]
    Recommended,
    Fips,
}

impl KeyVersion {
    pub fn parse(name: &str) -> Result<Self, KmsError> {
        match name {
            "recommended" => Ok(Self::Recommended),
            "fips" => Ok(Self::Fips),
            other => Err(KmsError::UnsupportedVersion(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::Fips => "fips",
        }
    }
}

impl FromStr for KeyVersion {
    type Err = KmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// -- Locating a key -----------------------------------------------------------

/// Where a key lives and which capability to invoke it with.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyLocator {
    pub id: String,
    pub kms_id: Option<String>,
    pub capability: Option<Capability>,
}

impl KeyLocator {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kms_id: None,
            capability: None,
        }
    }

    /// URL to send operations to, when it differs from the key id.
    pub fn kms_id(mut self, kms_id: impl Into<String>) -> Self {
        self.kms_id = Some(kms_id.into());
        self
    }

    /// Invoke under a delegated capability instead of the root capability.
    pub fn capability(mut self, capability: Capability) -> Self {
        self.capability = Some(capability);
        self
    }
}

// -- Shared handle state ------------------------------------------------------

/// State shared by every handle type.
#[derive(Clone)]
pub(crate) struct KeyRef {
    id: String,
    kms_id: String,
    key_type: KeyType,
    capability: Option<Capability>,
    signer: Arc<dyn InvocationSigner>,
    client: KmsClient,
}

impl KeyRef {
    pub(crate) fn new(
        locator: KeyLocator,
        key_type: KeyType,
        signer: Arc<dyn InvocationSigner>,
        client: KmsClient,
    ) -> Result<Self, KmsError> {
        if locator.id.is_empty() {
            return Err(KmsError::InvalidInput("key id must not be empty".into()));
        }
        let kms_id = match locator.kms_id {
            Some(kms_id) if !kms_id.is_empty() => kms_id,
            _ => locator.id.clone(),
        };
        Ok(Self {
            id: locator.id,
            kms_id,
            key_type,
            capability: locator.capability,
            signer,
            client,
        })
    }

    /// Fetch the key description (`read` action).
    async fn describe(&self) -> Result<KeyDescription, KmsError> {
        self.client
            .invoke(self.call(&Method::GET, "read"), None, self.signer.as_ref())
            .await
    }

    /// POST an operation body to the key (`action`).
    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        action: &str,
        body: &B,
    ) -> Result<T, KmsError> {
        let body = CanonicalBytes::new(body)?;
        self.client
            .invoke(
                self.call(&Method::POST, action),
                Some(body),
                self.signer.as_ref(),
            )
            .await
    }

    fn call<'a>(&'a self, method: &'a Method, action: &'a str) -> KmsCall<'a> {
        KmsCall {
            method,
            url: &self.kms_id,
            action,
            invocation_target: &self.kms_id,
            capability: self.capability.as_ref(),
        }
    }

    fn endpoint(&self) -> String {
        format!("POST {}", self.kms_id)
    }
}

impl fmt::Debug for KeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRef")
            .field("id", &self.id)
            .field("kms_id", &self.kms_id)
            .field("type", &self.key_type.as_str())
            .field("capability", &self.capability.as_ref().map(|c| &c.id))
            .field("signer", &self.signer.id())
            .finish()
    }
}

/// Accessors every handle exposes.
macro_rules! key_handle_accessors {
    () => {
        /// Key id.
        pub fn id(&self) -> &str {
            &self.key.id
        }

        /// URL operations are sent to.
        pub fn kms_id(&self) -> &str {
            &self.key.kms_id
        }

        pub fn key_type(&self) -> crate::keys::KeyType {
            self.key.key_type
        }

        /// Canonical type string, e.g. `Sha256HmacKey2019`.
        pub fn type_name(&self) -> &'static str {
            self.key.key_type.as_str()
        }

        /// Delegated capability, if any. `None` means the root capability.
        pub fn capability(&self) -> Option<&kmsc_zcap::Capability> {
            self.key.capability.as_ref()
        }

        /// Verification method id of the signer authorizing invocations.
        pub fn invocation_signer_id(&self) -> &str {
            self.key.signer.id()
        }

        /// Fetch the key's description from the KMS.
        pub async fn describe(&self) -> Result<crate::operation::KeyDescription, crate::error::KmsError> {
            self.key.describe().await
        }
    };
}
pub(crate) use key_handle_accessors;

// -- Generated keys -----------------------------------------------------------

/// A freshly generated key, typed by what was requested.
#[derive(Debug, Clone)]
pub enum GeneratedKey {
    Hmac(Hmac),
    Kek(Kek),
    Asymmetric(AsymmetricKey),
    KeyAgreement(KeyAgreementKey),
}

impl GeneratedKey {
    pub(crate) fn from_ref(key: KeyRef) -> Self {
        match key.key_type {
            KeyType::Hmac => Self::Hmac(Hmac::from_ref(key)),
            KeyType::Kek => Self::Kek(Kek::from_ref(key)),
            KeyType::Asymmetric => Self::Asymmetric(AsymmetricKey::from_ref(key)),
            KeyType::KeyAgreement => Self::KeyAgreement(KeyAgreementKey::from_ref(key)),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Hmac(k) => k.id(),
            Self::Kek(k) => k.id(),
            Self::Asymmetric(k) => k.id(),
            Self::KeyAgreement(k) => k.id(),
        }
    }

    pub fn key_type(&self) -> KeyType {
        match self {
            Self::Hmac(_) => KeyType::Hmac,
            Self::Kek(_) => KeyType::Kek,
            Self::Asymmetric(_) => KeyType::Asymmetric,
            Self::KeyAgreement(_) => KeyType::KeyAgreement,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.key_type().as_str()
    }

    pub fn into_hmac(self) -> Option<Hmac> {
        match self {
            Self::Hmac(k) => Some(k),
            _ => None,
        }
    }

    pub fn into_kek(self) -> Option<Kek> {
        match self {
            Self::Kek(k) => Some(k),
            _ => None,
        }
    }

    pub fn into_asymmetric(self) -> Option<AsymmetricKey> {
        match self {
            Self::Asymmetric(k) => Some(k),
            _ => None,
        }
    }

    pub fn into_key_agreement(self) -> Option<KeyAgreementKey> {
        match self {
            Self::KeyAgreement(k) => Some(k),
            _ => None,
        }
    }
}
