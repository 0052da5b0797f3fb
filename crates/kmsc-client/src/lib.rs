//! # kmsc-client — Client-Side KMS Controller
//!
//! Lets an application keep a single root secret locally while every key it
//! uses lives in a remote KMS:
//!
//! - [`ControllerKey`] derives the application's controller identity from
//!   `(secret, handle, key_name)` and mints key handles.
//! - Key handles ([`Hmac`], [`Kek`], [`AsymmetricKey`], [`KeyAgreementKey`])
//!   name a remote key and forward operations to it.
//! - [`KmsClient`] signs each request as a capability invocation and sends
//!   it.
//!
//! ```no_run
//! # async fn run() -> Result<(), kmsc_client::KmsError> {
//! use kmsc_client::{ControllerKey, FromSecretOptions, GenerateKeyOptions, KmsClient, KmsClientConfig};
//! use kmsc_crypto::SeedCache;
//!
//! let kms = KmsClient::new(KmsClientConfig::from_env()?)?;
//! let cache = SeedCache::default();
//! let ck = ControllerKey::from_secret(FromSecretOptions::new("pw", "alice"), &cache, kms)?;
//! let hmac = ck
//!     .generate_key(GenerateKeyOptions::new("hmac", "ssm-v1"))
//!     .await?
//!     .into_hmac()
//!     .ok_or(kmsc_client::KmsError::UnknownKeyType("hmac".into()))?;
//! let mac = hmac.sign(b"hello").await?;
//! assert!(hmac.verify(b"hello", &mac).await?);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod keys;
pub mod operation;

pub use client::{KmsCall, KmsClient};
pub use config::{ConfigError, KmsClientConfig};
pub use controller::{ControllerKey, FromSecretOptions, GenerateKeyOptions};
pub use error::KmsError;
pub use keys::{
    AsymmetricKey, GeneratedKey, Hmac, Kek, KeyAgreementKey, KeyLocator, KeyType, KeyVersion,
};
pub use operation::{KeyDescription, PublicKeyDescription};
