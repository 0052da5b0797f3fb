//! # Invocation Authorizer
//!
//! Turns an unsigned request description into the set of headers that
//! authorize it:
//!
//! 1. Pick the capability: the one supplied, or the implicit root
//!    capability of the invocation target.
//! 2. Digest the body (when there is one).
//! 3. Build the signing string over method, path, host, capability, action,
//!    digest and the validity window.
//! 4. Ask the signer for a signature. This is the only await point.
//! 5. Emit `authorization`, `capability-invocation`, `host` and, with a
//!    body, `content-type` and `digest`.
//!
//! Validation happens before the signer is called. Any failure leaves the
//! caller with an error and no headers, so an unsigned request cannot be
//! produced by accident.

use std::collections::BTreeMap;

use kmsc_core::{sha256_digest, CanonicalBytes, Timestamp};
use url::Url;

use crate::capability::{resolve_capability, Capability};
use crate::error::InvocationError;
use crate::http_signature::{
    build_signing_string, capability_invocation_header, covered_headers, is_quotable,
    request_target,
    SignatureParams, AUTHORIZATION, CAPABILITY_INVOCATION, CONTENT_TYPE, DIGEST, HOST,
    JSON_CONTENT_TYPE, REQUEST_TARGET,
};
use crate::signer::InvocationSigner;

/// Default validity window of an invocation, in seconds.
pub const DEFAULT_INVOCATION_TTL_SECS: u64 = 600;

/// A request to be authorized.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub url: &'a Url,
    /// HTTP method, any case.
    pub method: &'a str,
    /// Capability action, e.g. `sign` or `generateKey`.
    pub action: &'a str,
    /// Resource the capability is checked against; the key's kmsId, or the
    /// keystore's keys collection for key generation.
    pub invocation_target: &'a str,
    pub capability: Option<&'a Capability>,
    pub body: Option<&'a CanonicalBytes>,
}

/// Headers that authorize one invocation, keyed by lower-case header name.
#[derive(Debug, Clone)]
pub struct SignedInvocation {
    pub headers: BTreeMap<String, String>,
    pub capability: Capability,
    pub created: Timestamp,
    pub expires: Timestamp,
}

impl SignedInvocation {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Signs capability invocations with a fixed validity window.
#[derive(Debug, Clone)]
pub struct InvocationAuthorizer {
    ttl_secs: u64,
    fixed_created: Option<Timestamp>,
}

impl Default for InvocationAuthorizer {
    fn default() -> Self {
        Self::new(DEFAULT_INVOCATION_TTL_SECS)
    }
}

impl InvocationAuthorizer {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl_secs,
            fixed_created: None,
        }
    }

    /// Stamp every invocation with `created` instead of the current time.
    pub fn with_fixed_created(mut self, created: Timestamp) -> Self {
        self.fixed_created = Some(created);
        self
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Produce the headers authorizing `invocation`, signed by `signer`.
    pub async fn authorize(
        &self,
        invocation: Invocation<'_>,
        signer: &dyn InvocationSigner,
    ) -> Result<SignedInvocation, InvocationError> {
        if signer.id().is_empty() {
            return Err(InvocationError::MissingSigner("id"));
        }
        if signer.key_type().is_empty() {
            return Err(InvocationError::MissingSigner("type"));
        }
        if invocation.invocation_target.is_empty() {
            return Err(InvocationError::MissingTarget);
        }
        if invocation.action.is_empty() {
            return Err(InvocationError::MissingAction);
        }
        if invocation.capability.is_some_and(|c| c.id.is_empty()) {
            return Err(InvocationError::InvalidCapability);
        }
        let mut quoted = vec![("keyId", signer.id()), ("action", invocation.action)];
        if let Some(capability) = invocation.capability {
            quoted.push(("capability id", capability.id.as_str()));
        }
        if let Some((param, value)) = quoted.into_iter().find(|(_, v)| !is_quotable(v)) {
            return Err(InvocationError::UnquotableParameter {
                param,
                value: value.to_string(),
            });
        }
        let host = host_header(invocation.url)?;

        let capability = resolve_capability(invocation.capability, invocation.invocation_target);
        let created = self.fixed_created.unwrap_or_else(Timestamp::now);
        let expires = created
            .checked_add_secs(self.ttl_secs)
            .ok_or(InvocationError::ExpiryOverflow)?;

        let mut headers = BTreeMap::new();
        headers.insert(HOST.to_string(), host);
        headers.insert(
            CAPABILITY_INVOCATION.to_string(),
            capability_invocation_header(&capability.id, invocation.action),
        );
        if let Some(body) = invocation.body {
            headers.insert(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string());
            headers.insert(DIGEST.to_string(), sha256_digest(body).to_header_value());
        }

        let mut params = SignatureParams {
            key_id: signer.id().to_string(),
            headers: covered_headers(invocation.body.is_some())
                .into_iter()
                .map(str::to_string)
                .collect(),
            signature: Vec::new(),
            created: created.epoch_secs(),
            expires: expires.epoch_secs(),
        };
        let target = request_target(invocation.method, &path_and_query(invocation.url));
        let signing_string = build_signing_string(&params.headers, |name| {
            if name == REQUEST_TARGET {
                return Some(target.clone());
            }
            params
                .pseudo_header(name)
                .or_else(|| headers.get(name).cloned())
        })?;

        params.signature = signer.sign(signing_string.as_bytes()).await.map_err(|source| {
            InvocationError::SignerRejected {
                signer: signer.id().to_string(),
                source,
            }
        })?;
        headers.insert(AUTHORIZATION.to_string(), params.to_header_value());

        tracing::debug!(
            action = invocation.action,
            capability = %capability.id,
            target = invocation.invocation_target,
            signer = signer.id(),
            "signed capability invocation"
        );

        Ok(SignedInvocation {
            headers,
            capability,
            created,
            expires,
        })
    }
}

/// `host` header value: host name, plus the port when it is not the
/// scheme's default.
fn host_header(url: &Url) -> Result<String, InvocationError> {
    let host = url.host_str().ok_or_else(|| InvocationError::InvalidUrl {
        url: url.to_string(),
        reason: "URL has no host".into(),
    })?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{q}", url.path()),
        None => url.path().to_string(),
    }
}
