//! # kmsc-core — Foundational Types for the KMS Controller
//!
//! This crate is the leaf of the workspace. It defines the small set of
//! primitives every other crate agrees on:
//!
//! 1. **`CanonicalBytes` newtype.** Every JSON body sent to the remote KMS is
//!    produced through `CanonicalBytes::new()` (RFC 8785 / JCS), so the bytes
//!    that are digested are exactly the bytes that are sent.
//!
//! 2. **`ContentDigest`.** SHA-256 over canonical bytes, rendered either as
//!    hex or as the `digest` header value bound into invocation signatures.
//!
//! 3. **Identifier newtypes.** `Did` (validated `did:method:id`) and `Handle`
//!    (the application-chosen scope for a secret).
//!
//! 4. **UTC-only timestamps.** `Timestamp` carries the created/expires window
//!    of a capability invocation at seconds precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `kmsc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_raw, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{Did, Handle};
pub use temporal::Timestamp;
