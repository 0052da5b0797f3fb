//! # Controller Key
//!
//! The root identity of an application in the KMS. A controller key is
//! derived from an application secret and a handle, never stored:
//!
//! ```text
//! seed       = SHA-256(urlEncode(handle) ":" urlEncode(secret))
//! key pair   = Ed25519(HMAC-SHA-256(seed, key_name))
//! id         = did:key:<fp>#<fp>
//! ```
//!
//! The seed may be cached under the handle so the same identity can be
//! re-acquired later in the process without the secret. The controller signs
//! capability invocations for every key handle it mints, so keys it
//! generates are controlled by it and need no delegated capability.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use kmsc_core::{CanonicalBytes, Did, Handle};
use kmsc_crypto::{
    derive_key, salted_seed, Ed25519KeyPair, Ed25519PublicKey, Secret, Seed, SeedCache,
    DEFAULT_KEY_NAME, DERIVED_KEY_TYPE,
};
use kmsc_zcap::{InvocationSigner, SignerError};
use reqwest::Method;
use serde_json::Value;

use crate::client::{KmsCall, KmsClient};
use crate::error::KmsError;
use crate::keys::{
    AsymmetricKey, GeneratedKey, Hmac, Kek, KeyAgreementKey, KeyLocator, KeyRef, KeyType,
    KeyVersion,
};
use crate::operation::{GenerateKeyOperation, KeyDescription};

// -- Options ------------------------------------------------------------------

/// Inputs of [`ControllerKey::from_secret`].
#[derive(Debug, Clone)]
pub struct FromSecretOptions {
    secret: Secret,
    handle: Handle,
    key_name: String,
    cache: bool,
}

impl FromSecretOptions {
    /// Derive the `default` key for `(secret, handle)` and cache its seed.
    pub fn new(secret: impl Into<Secret>, handle: impl Into<Handle>) -> Self {
        Self {
            secret: secret.into(),
            handle: handle.into(),
            key_name: DEFAULT_KEY_NAME.to_string(),
            cache: true,
        }
    }

    pub fn key_name(mut self, key_name: impl Into<String>) -> Self {
        self.key_name = key_name.into();
        self
    }

    /// Whether to store the seed in the cache (default: true).
    pub fn cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }
}

/// Build options from loosely typed JSON such as
/// `{"secret": "pw", "handle": "alice", "keyName": "default", "cache": true}`.
///
/// `handle` must be a string. `secret` must be a string or an array of byte
/// values. Anything else is rejected before any derivation happens.
impl TryFrom<&Value> for FromSecretOptions {
    type Error = KmsError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let obj = value
            .as_object()
            .ok_or_else(|| KmsError::InvalidInput("options must be an object".into()))?;

        let handle = match obj.get("handle") {
            Some(Value::String(h)) => Handle::new(h.clone()),
            _ => return Err(KmsError::InvalidInput("\"handle\" must be a string".into())),
        };
        let secret = match obj.get("secret") {
            Some(Value::String(s)) => Secret::from(s.as_str()),
            Some(Value::Array(items)) => Secret::new(
                items
                    .iter()
                    .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
                    .collect::<Option<Vec<u8>>>()
                    .ok_or_else(|| {
                        KmsError::InvalidInput("\"secret\" array must contain bytes".into())
                    })?,
            ),
            _ => {
                return Err(KmsError::InvalidInput(
                    "\"secret\" must be a string or a byte array".into(),
                ))
            }
        };

        let mut opts = Self::new(secret, handle);
        match obj.get("keyName") {
            None | Some(Value::Null) => {}
            Some(Value::String(name)) => opts.key_name = name.clone(),
            Some(_) => return Err(KmsError::InvalidInput("\"keyName\" must be a string".into())),
        }
        match obj.get("cache") {
            None | Some(Value::Null) => {}
            Some(Value::Bool(cache)) => opts.cache = *cache,
            Some(_) => return Err(KmsError::InvalidInput("\"cache\" must be a boolean".into())),
        }
        Ok(opts)
    }
}

/// Inputs of [`ControllerKey::generate_key`].
#[derive(Debug, Clone, Copy)]
pub struct GenerateKeyOptions<'a> {
    /// Type name or alias, e.g. `hmac` or `Sha256HmacKey2019`.
    pub key_type: &'a str,
    /// KMS module to create the key in.
    pub kms_module: &'a str,
    /// `recommended` (default) or `fips`.
    pub version: Option<&'a str>,
}

impl<'a> GenerateKeyOptions<'a> {
    pub fn new(key_type: &'a str, kms_module: &'a str) -> Self {
        Self {
            key_type,
            kms_module,
            version: None,
        }
    }

    pub fn version(mut self, version: &'a str) -> Self {
        self.version = Some(version);
        self
    }
}

// -- Controller key -----------------------------------------------------------

struct ControllerInner {
    handle: Handle,
    key_name: String,
    did: Did,
    id: String,
    key_pair: Ed25519KeyPair,
    kms: KmsClient,
}

/// A secret-derived controller identity. Cheap to clone.
#[derive(Clone)]
pub struct ControllerKey {
    inner: Arc<ControllerInner>,
}

impl ControllerKey {
    /// Derive the controller for `opts`, caching the seed unless disabled.
    pub fn from_secret(
        opts: FromSecretOptions,
        cache: &SeedCache,
        kms: KmsClient,
    ) -> Result<Self, KmsError> {
        let seed = salted_seed(&opts.secret, &opts.handle);
        let controller = Self::from_seed(opts.handle.clone(), &seed, &opts.key_name, kms)?;
        if opts.cache {
            cache.set(opts.handle, seed);
        }
        Ok(controller)
    }

    /// Re-derive the controller for `handle` from its cached seed.
    ///
    /// `Ok(None)` when nothing is cached: the caller must fall back to
    /// [`from_secret`](Self::from_secret).
    pub fn from_cache(
        handle: &Handle,
        key_name: Option<&str>,
        cache: &SeedCache,
        kms: KmsClient,
    ) -> Result<Option<Self>, KmsError> {
        let Some(seed) = cache.get(handle) else {
            return Ok(None);
        };
        let key_name = key_name.unwrap_or(DEFAULT_KEY_NAME);
        Self::from_seed(handle.clone(), &seed, key_name, kms).map(Some)
    }

    /// Forget the cached seed for `handle`.
    pub fn clear_cache(handle: &Handle, cache: &SeedCache) {
        if cache.delete(handle) {
            tracing::debug!(handle = %handle, "cleared cached controller seed");
        }
    }

    pub fn from_biometric() -> Result<Self, KmsError> {
        Err(KmsError::NotImplemented("ControllerKey::from_biometric"))
    }

    pub fn from_fido() -> Result<Self, KmsError> {
        Err(KmsError::NotImplemented("ControllerKey::from_fido"))
    }

    fn from_seed(
        handle: Handle,
        seed: &Seed,
        key_name: &str,
        kms: KmsClient,
    ) -> Result<Self, KmsError> {
        let derived = derive_key(seed, key_name)?;
        let did = derived.public_id().clone();
        let id = derived.verification_method().to_string();
        tracing::debug!(handle = %handle, key_name, id = %id, "derived controller key");
        Ok(Self {
            inner: Arc::new(ControllerInner {
                handle,
                key_name: key_name.to_string(),
                did,
                id,
                key_pair: derived.into_key_pair(),
                kms,
            }),
        })
    }

    pub fn handle(&self) -> &Handle {
        &self.inner.handle
    }

    pub fn key_name(&self) -> &str {
        &self.inner.key_name
    }

    /// Verification method id, `did:key:<fp>#<fp>`.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Controller DID, `did:key:<fp>`.
    pub fn did(&self) -> &Did {
        &self.inner.did
    }

    pub fn key_type(&self) -> &'static str {
        DERIVED_KEY_TYPE
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.inner.key_pair.public_key()
    }

    pub fn kms(&self) -> &KmsClient {
        &self.inner.kms
    }

    /// Create a key in the KMS controlled by this controller.
    pub async fn generate_key(&self, opts: GenerateKeyOptions<'_>) -> Result<GeneratedKey, KmsError> {
        let key_type = KeyType::parse(opts.key_type)?;
        let version = match opts.version {
            Some(v) => KeyVersion::parse(v)?,
            None => KeyVersion::default(),
        };
        if opts.kms_module.is_empty() {
            return Err(KmsError::InvalidInput("kms module must not be empty".into()));
        }

        let keys_url = self.kms().keys_url();
        let body = CanonicalBytes::new(&GenerateKeyOperation::new(
            key_type.type_for_version(version),
            self.did().as_str(),
            opts.kms_module,
        ))?;
        let call = KmsCall {
            method: &Method::POST,
            url: &keys_url,
            action: "generateKey",
            invocation_target: &keys_url,
            capability: None,
        };
        let description: KeyDescription = self.kms().invoke(call, Some(body), self).await?;

        tracing::debug!(
            id = %description.id,
            key_type = %key_type,
            version = version.as_str(),
            "generated key"
        );
        let key = KeyRef::new(
            KeyLocator::new(description.id),
            key_type,
            self.as_signer(),
            self.kms().clone(),
        )?;
        Ok(GeneratedKey::from_ref(key))
    }

    pub fn get_kek(&self, locator: KeyLocator) -> Result<Kek, KmsError> {
        self.key_ref(locator, KeyType::Kek).map(Kek::from_ref)
    }

    pub fn get_hmac(&self, locator: KeyLocator) -> Result<Hmac, KmsError> {
        self.key_ref(locator, KeyType::Hmac).map(Hmac::from_ref)
    }

    pub fn get_asymmetric_key(&self, locator: KeyLocator) -> Result<AsymmetricKey, KmsError> {
        self.key_ref(locator, KeyType::Asymmetric)
            .map(AsymmetricKey::from_ref)
    }

    pub fn get_key_agreement_key(&self, locator: KeyLocator) -> Result<KeyAgreementKey, KmsError> {
        self.key_ref(locator, KeyType::KeyAgreement)
            .map(KeyAgreementKey::from_ref)
    }

    fn key_ref(&self, locator: KeyLocator, key_type: KeyType) -> Result<KeyRef, KmsError> {
        KeyRef::new(locator, key_type, self.as_signer(), self.kms().clone())
    }

    fn as_signer(&self) -> Arc<dyn InvocationSigner> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl InvocationSigner for ControllerKey {
    fn id(&self) -> &str {
        &self.inner.id
    }

    fn key_type(&self) -> &str {
        DERIVED_KEY_TYPE
    }

    async fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SignerError> {
        Ok(self.inner.key_pair.sign(data).to_vec())
    }
}

impl fmt::Debug for ControllerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerKey")
            .field("handle", &self.inner.handle)
            .field("key_name", &self.inner.key_name)
            .field("id", &self.inner.id)
            .finish()
    }
}
