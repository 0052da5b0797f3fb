//! # Identifier Newtypes
//!
//! - `Did`: W3C Decentralized Identifier (`did:method:identifier`). Controller
//!   identities are `did:key` DIDs.
//! - `Handle`: the application-chosen string that scopes a secret (an account
//!   id, for instance). It salts the seed hash and keys the seed cache.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// W3C Decentralized Identifier (DID).
///
/// # Validation
///
/// - Must start with `did:`
/// - Method name must be non-empty, lowercase alphanumeric
/// - Method-specific identifier must be non-empty
///
/// Reference: <https://www.w3.org/TR/did-core/#did-syntax>
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Did(String);

impl Did {
    /// Create a DID from a string, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDid`] if the string does not match
    /// the `did:method:identifier` format.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        split_did(&s).ok_or_else(|| ValidationError::InvalidDid(s.clone()))?;
        Ok(Self(s))
    }

    /// Access the DID string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the DID method (`key` for `did:key:z6Mk...`).
    pub fn method(&self) -> &str {
        split_did(&self.0).map(|(m, _)| m).unwrap_or_default()
    }

    /// Return the method-specific identifier (everything after `did:method:`).
    pub fn method_specific_id(&self) -> &str {
        split_did(&self.0).map(|(_, id)| id).unwrap_or_default()
    }
}

/// Split a DID into `(method, method_specific_id)` if it is well formed.
fn split_did(s: &str) -> Option<(&str, &str)> {
    let rest = s.strip_prefix("did:")?;
    let (method, identifier) = rest.split_once(':')?;
    let method_ok = !method.is_empty()
        && method
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !method_ok || identifier.is_empty() {
        return None;
    }
    Some((method, identifier))
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Application-chosen scope for a secret.
///
/// Any string is accepted, including the empty string. Two different secrets
/// under the same handle overwrite each other's cached seed; detecting that
/// is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Wrap a handle string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the handle string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Handle {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Handle {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn did_valid_examples() {
        assert!(Did::new("did:web:example.com").is_ok());
        assert!(Did::new("did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK").is_ok());
    }

    #[test]
    fn did_method_extraction() {
        let did = Did::new("did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK").unwrap();
        assert_eq!(did.method(), "key");
        assert_eq!(
            did.method_specific_id(),
            "z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK"
        );
    }

    #[test]
    fn did_rejects_invalid() {
        assert!(Did::new("").is_err());
        assert!(Did::new("notadid").is_err());
        assert!(Did::new("did:").is_err());
        assert!(Did::new("did::something").is_err());
        assert!(Did::new("did:Key:z6Mk").is_err());
        assert!(Did::new("did:key:").is_err());
    }

    #[test]
    fn did_serde_rejects_invalid() {
        let ok: Result<Did, _> = serde_json::from_str(r#""did:key:z6Mk""#);
        assert!(ok.is_ok());
        let bad: Result<Did, _> = serde_json::from_str(r#""key:z6Mk""#);
        assert!(bad.is_err());
    }

    #[test]
    fn handle_accepts_any_string() {
        assert_eq!(Handle::new("").as_str(), "");
        assert_eq!(Handle::from("alice@example.com").to_string(), "alice@example.com");
        let json = serde_json::to_string(&Handle::from("alice")).unwrap();
        assert_eq!(json, r#""alice""#);
    }
}
