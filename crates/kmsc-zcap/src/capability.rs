//! # Authorization Capabilities
//!
//! A capability names a resource (its `invocationTarget`) and grants its
//! controller the right to invoke actions on it. This crate never verifies
//! or delegates capabilities; it only reads the `id` of one that was handed
//! in, or synthesizes the implicit root capability when none was.
//!
//! The root capability for a target is `urn:zcap:root:<urlEncode(target)>`.
//! It asserts that the target's root controller may invoke any action on it.

use serde::{Deserialize, Serialize};

/// Prefix of every implicit root capability id.
pub const ROOT_CAPABILITY_PREFIX: &str = "urn:zcap:root:";

/// An authorization capability, as far as invocation needs it.
///
/// Fields the invoker does not interpret (proofs, caveats, expiry) are kept
/// in `extra` so a delegated capability passes through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Capability {
    /// Refer to an externally issued capability by id alone.
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            invocation_target: None,
            controller: None,
            extra: serde_json::Map::new(),
        }
    }

    /// The implicit root capability for `target`.
    pub fn root(target: &str) -> Self {
        Self {
            id: root_capability_id(target),
            invocation_target: Some(target.to_string()),
            controller: None,
            extra: serde_json::Map::new(),
        }
    }

    /// True if this is a root capability.
    pub fn is_root(&self) -> bool {
        self.id.starts_with(ROOT_CAPABILITY_PREFIX)
    }
}

/// Id of the root capability for `target`.
pub fn root_capability_id(target: &str) -> String {
    format!("{ROOT_CAPABILITY_PREFIX}{}", urlencoding::encode(target))
}

/// Select the capability to invoke `target` with: the supplied one, or the
/// implicit root capability.
pub fn resolve_capability(supplied: Option<&Capability>, target: &str) -> Capability {
    match supplied {
        Some(cap) => cap.clone(),
        None => Capability::root(target),
    }
}
