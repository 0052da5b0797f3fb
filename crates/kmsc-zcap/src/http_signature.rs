//! # HTTP Signatures for Capability Invocations
//!
//! The signing string is a newline-joined list of `name: value` lines, one
//! per covered header, in the order they are listed in the `headers`
//! parameter of the `authorization` header:
//!
//! ```text
//! (key-id): did:key:z6Mk...#z6Mk...
//! (created): 1767225600
//! (expires): 1767226200
//! (request-target): post /keystores/z1/keys/k1
//! host: kms.example.com
//! capability-invocation: zcap id="urn:zcap:root:...",action="sign"
//! content-type: application/json
//! digest: SHA-256=R12DVba6P6BIsyFMXBrW4qpdJatWyuAg21INjubzWFs=
//! ```
//!
//! Pseudo-headers in parentheses are not sent as HTTP headers; their values
//! come from the signature parameters and the request line. Both the signer
//! and a verifier build the string through [`build_signing_string`], so the
//! two sides cannot drift apart.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::InvocationError;

pub const KEY_ID: &str = "(key-id)";
pub const CREATED: &str = "(created)";
pub const EXPIRES: &str = "(expires)";
pub const REQUEST_TARGET: &str = "(request-target)";
pub const HOST: &str = "host";
pub const CAPABILITY_INVOCATION: &str = "capability-invocation";
pub const CONTENT_TYPE: &str = "content-type";
pub const DIGEST: &str = "digest";
pub const AUTHORIZATION: &str = "authorization";

/// Content type of every invocation body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Headers covered by an invocation signature, in signing order.
pub fn covered_headers(has_body: bool) -> Vec<&'static str> {
    let mut headers = vec![
        KEY_ID,
        CREATED,
        EXPIRES,
        REQUEST_TARGET,
        HOST,
        CAPABILITY_INVOCATION,
    ];
    if has_body {
        headers.extend([CONTENT_TYPE, DIGEST]);
    }
    headers
}

/// Build the signing string over `names`, resolving each through `lookup`.
pub fn build_signing_string<S, F>(names: &[S], lookup: F) -> Result<String, InvocationError>
where
    S: AsRef<str>,
    F: Fn(&str) -> Option<String>,
{
    let mut lines = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        let value = lookup(name).ok_or_else(|| InvocationError::MissingHeader(name.to_string()))?;
        lines.push(format!("{name}: {value}"));
    }
    Ok(lines.join("\n"))
}

/// `(request-target)` value: lower-case method, a space, then path and query.
pub fn request_target(method: &str, path_and_query: &str) -> String {
    format!("{} {}", method.to_ascii_lowercase(), path_and_query)
}

// ─── capability-invocation ───────────────────────────────────────────────

/// True if `value` can sit between the double quotes of a header parameter
/// without escaping.
pub fn is_quotable(value: &str) -> bool {
    !value.chars().any(|c| c == '"' || c == '\\' || c.is_control())
}

/// `capability-invocation` header value. Both values must be
/// [quotable](is_quotable).
pub fn capability_invocation_header(capability_id: &str, action: &str) -> String {
    format!("zcap id=\"{capability_id}\",action=\"{action}\"")
}

/// Parsed `capability-invocation` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityInvocation {
    pub id: String,
    pub action: String,
}

/// Parse a `capability-invocation` header value.
pub fn parse_capability_invocation(value: &str) -> Result<CapabilityInvocation, InvocationError> {
    let malformed = |reason: &str| InvocationError::MalformedHeader {
        header: CAPABILITY_INVOCATION,
        reason: reason.to_string(),
    };
    let params = value
        .strip_prefix("zcap ")
        .ok_or_else(|| malformed("expected 'zcap' scheme"))?;
    let mut id = None;
    let mut action = None;
    for (key, val) in parse_params(params).map_err(|r| malformed(&r))? {
        match key.as_str() {
            "id" => id = Some(val),
            "action" => action = Some(val),
            _ => {}
        }
    }
    Ok(CapabilityInvocation {
        id: id.ok_or_else(|| malformed("missing id"))?,
        action: action.ok_or_else(|| malformed("missing action"))?,
    })
}

// ─── authorization ───────────────────────────────────────────────────────

/// Parameters of an `authorization: Signature ...` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParams {
    pub key_id: String,
    pub headers: Vec<String>,
    pub signature: Vec<u8>,
    pub created: i64,
    pub expires: i64,
}

impl SignatureParams {
    /// Render as an `authorization` header value.
    pub fn to_header_value(&self) -> String {
        format!(
            "Signature keyId=\"{}\",headers=\"{}\",signature=\"{}\",created=\"{}\",expires=\"{}\"",
            self.key_id,
            self.headers.join(" "),
            STANDARD.encode(&self.signature),
            self.created,
            self.expires,
        )
    }

    /// Value of a pseudo-header derived from these parameters.
    pub fn pseudo_header(&self, name: &str) -> Option<String> {
        match name {
            KEY_ID => Some(self.key_id.clone()),
            CREATED => Some(self.created.to_string()),
            EXPIRES => Some(self.expires.to_string()),
            _ => None,
        }
    }
}

/// Parse an `authorization` header value produced by [`SignatureParams::to_header_value`].
pub fn parse_authorization(value: &str) -> Result<SignatureParams, InvocationError> {
    let malformed = |reason: String| InvocationError::MalformedHeader {
        header: AUTHORIZATION,
        reason,
    };
    let params = value
        .strip_prefix("Signature ")
        .ok_or_else(|| malformed("expected 'Signature' scheme".into()))?;

    let mut key_id = None;
    let mut headers = None;
    let mut signature = None;
    let mut created = None;
    let mut expires = None;
    for (key, val) in parse_params(params).map_err(malformed)? {
        match key.as_str() {
            "keyId" => key_id = Some(val),
            "headers" => headers = Some(val.split(' ').map(str::to_string).collect()),
            "signature" => {
                signature = Some(
                    STANDARD
                        .decode(&val)
                        .map_err(|e| malformed(format!("signature is not base64: {e}")))?,
                )
            }
            "created" => {
                created = Some(
                    val.parse::<i64>()
                        .map_err(|e| malformed(format!("created: {e}")))?,
                )
            }
            "expires" => {
                expires = Some(
                    val.parse::<i64>()
                        .map_err(|e| malformed(format!("expires: {e}")))?,
                )
            }
            _ => {}
        }
    }

    Ok(SignatureParams {
        key_id: key_id.ok_or_else(|| malformed("missing keyId".into()))?,
        headers: headers.ok_or_else(|| malformed("missing headers".into()))?,
        signature: signature.ok_or_else(|| malformed("missing signature".into()))?,
        created: created.ok_or_else(|| malformed("missing created".into()))?,
        expires: expires.ok_or_else(|| malformed("missing expires".into()))?,
    })
}

/// Split `k1="v1",k2="v2"` into pairs. Values may contain commas.
fn parse_params(input: &str) -> Result<Vec<(String, String)>, String> {
    let mut out = Vec::new();
    let mut rest = input.trim();
    while !rest.is_empty() {
        let (key, after_key) = rest
            .split_once("=\"")
            .ok_or_else(|| format!("expected key=\"value\" at {rest:?}"))?;
        let (val, after_val) = after_key
            .split_once('"')
            .ok_or_else(|| format!("unterminated value for {key:?}"))?;
        out.push((key.trim().to_string(), val.to_string()));
        rest = after_val.trim_start();
        rest = rest.strip_prefix(',').unwrap_or(rest).trim_start();
    }
    Ok(out)
}
