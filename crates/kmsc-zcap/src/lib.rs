//! # kmsc-zcap — Capability Invocations
//!
//! Produces the HTTP-signature headers that authorize a request to the
//! remote KMS under an authorization capability.
//!
//! - **Capability** (`capability.rs`): supplied capabilities and the implicit
//!   root capability `urn:zcap:root:<urlEncode(target)>`.
//! - **Signer** (`signer.rs`): the `InvocationSigner` trait. Implemented by
//!   the controller key and by any delegate.
//! - **HTTP signatures** (`http_signature.rs`): signing string, header
//!   formatting and parsing.
//! - **Authorizer** (`authorizer.rs`): ties the above together for one
//!   request.
//!
//! Capability delegation and verification of delegation chains are the
//! remote service's job and do not live here.

pub mod authorizer;
pub mod capability;
pub mod error;
pub mod http_signature;
pub mod signer;

pub use authorizer::{
    Invocation, InvocationAuthorizer, SignedInvocation, DEFAULT_INVOCATION_TTL_SECS,
};
pub use capability::{resolve_capability, root_capability_id, Capability, ROOT_CAPABILITY_PREFIX};
pub use error::{InvocationError, SignerError};
pub use http_signature::{
    build_signing_string, parse_authorization, parse_capability_invocation, CapabilityInvocation,
    SignatureParams,
};
pub use signer::InvocationSigner;
