//! # kmsc-crypto — Controller Key Derivation
//!
//! Turns an application secret into a reproducible Ed25519 controller
//! identity without persisting any key material:
//!
//! - **Seed** (`seed.rs`): `SHA-256(urlEncode(handle) ":" urlEncode(secret))`.
//! - **Derivation** (`derive.rs`): `HMAC-SHA-256(seed, keyName)` seeds an
//!   Ed25519 key pair; the public key becomes a `did:key` identifier.
//! - **did:key** (`did_key.rs`): multibase/multicodec fingerprints and the
//!   reverse mapping back to a public key.
//! - **Ed25519** (`ed25519.rs`): key pair, public key and signature newtypes.
//! - **Seed cache** (`seed_cache.rs`): bounded LRU map from handle to seed so
//!   a controller can be re-derived without the secret.
//!
//! ## Crate Policy
//!
//! - Depends only on `kmsc-core` internally.
//! - Secrets, seeds and private keys are zeroized on drop and never appear in
//!   `Debug` output or log lines.
//! - No mocking of cryptographic operations in tests.

pub mod derive;
pub mod did_key;
pub mod ed25519;
pub mod error;
pub mod seed;
pub mod seed_cache;

pub use derive::{derive_key, DerivedKey, DEFAULT_KEY_NAME, DERIVED_KEY_TYPE};
pub use did_key::{did_key_for, fingerprint, public_key_from_did_key, verification_method_id};
pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use error::CryptoError;
pub use seed::{salted_seed, Secret, Seed};
pub use seed_cache::{CacheStatsSnapshot, SeedCache, SeedCacheConfig};
