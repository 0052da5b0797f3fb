//! In-memory KMS behind a wiremock server.
//!
//! Checks every invocation the way a real KMS would before touching a key:
//! the HTTP signature must verify against the `did:key` in `keyId`, the body
//! digest must match, the capability must be the key's root capability (and
//! the signer its controller) or an explicitly allowed delegated one. Key
//! operations compute real values so results can be checked end to end.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use kmsc_client::{KmsClient, KmsClientConfig};
use kmsc_core::{sha256_raw, ContentDigest, DigestAlgorithm, Timestamp};
use kmsc_crypto::{public_key_from_did_key, Ed25519KeyPair, Ed25519Signature};
use kmsc_zcap::http_signature::{request_target, REQUEST_TARGET};
use kmsc_zcap::{
    build_signing_string, parse_authorization, parse_capability_invocation, root_capability_id,
    InvocationAuthorizer,
};
use serde_json::{json, Value};
use sha2::Sha256;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const KEYSTORE_PATH: &str = "/keystores/test";
pub const WRAP_PREFIX: &str = "w1.";

struct StoredKey {
    key_type: String,
    controller: String,
    secret: [u8; 32],
}

#[derive(Default)]
struct State {
    keys: HashMap<String, StoredKey>,
    delegated: HashSet<String>,
    next_id: u64,
}

/// Verified facts about one invocation.
struct Verified {
    signer_did: String,
    capability_id: String,
    action: String,
}

#[derive(Clone)]
pub struct MockKms {
    base_uri: String,
    state: Arc<Mutex<State>>,
}

impl MockKms {
    /// Start a server with the mock KMS answering every request.
    pub async fn start() -> (MockServer, MockKms) {
        let server = MockServer::start().await;
        let kms = MockKms {
            base_uri: server.uri(),
            state: Arc::new(Mutex::new(State::default())),
        };
        Mock::given(any())
            .respond_with(kms.clone())
            .mount(&server)
            .await;
        (server, kms)
    }

    pub fn client(&self) -> KmsClient {
        KmsClient::new(KmsClientConfig::local_mock(&self.base_uri).unwrap()).unwrap()
    }

    pub fn client_with_authorizer(&self, authorizer: InvocationAuthorizer) -> KmsClient {
        self.client().with_authorizer(authorizer)
    }

    pub fn keys_url(&self) -> String {
        format!("{}{KEYSTORE_PATH}/keys", self.base_uri)
    }

    /// Accept invocations under `capability_id` without checking the chain.
    pub fn allow_delegated(&self, capability_id: &str) {
        self.state.lock().unwrap().delegated.insert(capability_id.to_string());
    }

    /// Controller recorded for `key_id`.
    pub fn controller_of(&self, key_id: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .keys
            .get(key_id)
            .map(|k| k.controller.clone())
    }

    /// The HMAC the KMS computes for `data` under `key_id`.
    pub fn expected_hmac(&self, key_id: &str, data: &[u8]) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state.keys.get(key_id).map(|k| hmac_sha256(&k.secret, data))
    }

    /// Public key of an Ed25519 key generated by the KMS.
    pub fn ed25519_public_key(&self, key_id: &str) -> Option<kmsc_crypto::Ed25519PublicKey> {
        let state = self.state.lock().unwrap();
        state
            .keys
            .get(key_id)
            .map(|k| Ed25519KeyPair::from_seed(&k.secret).public_key())
    }

    fn verify_invocation(&self, req: &Request) -> Result<Verified, (u16, String)> {
        let header = |name: &str| {
            req.headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let unauthorized = |reason: &str| reject(401, reason);

        let auth = header("authorization").ok_or_else(|| unauthorized("missing authorization"))?;
        let params = parse_authorization(&auth).map_err(|e| unauthorized(&e.to_string()))?;
        let path_and_query = match req.url.query() {
            Some(q) => format!("{}?{q}", req.url.path()),
            None => req.url.path().to_string(),
        };
        let target = request_target(req.method.as_str(), &path_and_query);
        let signing_string = build_signing_string(&params.headers, |name| {
            if name == REQUEST_TARGET {
                return Some(target.clone());
            }
            params.pseudo_header(name).or_else(|| header(name))
        })
        .map_err(|e| unauthorized(&e.to_string()))?;

        let public_key =
            public_key_from_did_key(&params.key_id).map_err(|e| unauthorized(&e.to_string()))?;
        let signature =
            Ed25519Signature::from_slice(&params.signature).map_err(|e| unauthorized(&e.to_string()))?;
        public_key
            .verify(signing_string.as_bytes(), &signature)
            .map_err(|_| unauthorized("signature does not verify"))?;

        if params.expires <= params.created {
            return Err(unauthorized("empty validity window"));
        }
        if params.expires < Timestamp::now().epoch_secs() {
            return Err(unauthorized("invocation expired"));
        }

        if !req.body.is_empty() {
            let expected =
                ContentDigest::new(DigestAlgorithm::Sha256, sha256_raw(&req.body)).to_header_value();
            if header("digest").as_deref() != Some(expected.as_str()) {
                return Err(unauthorized("digest mismatch"));
            }
            if !params.headers.iter().any(|h| h == "digest") {
                return Err(unauthorized("digest not signed"));
            }
        }

        let zcap = header("capability-invocation")
            .ok_or_else(|| unauthorized("missing capability-invocation"))
            .and_then(|v| parse_capability_invocation(&v).map_err(|e| unauthorized(&e.to_string())))?;

        Ok(Verified {
            signer_did: params
                .key_id
                .split_once('#')
                .map_or(params.key_id.as_str(), |(did, _)| did)
                .to_string(),
            capability_id: zcap.id,
            action: zcap.action,
        })
    }

    fn handle(&self, req: &Request) -> Result<Value, (u16, String)> {
        let verified = self.verify_invocation(req)?;
        let url = format!("{}{}", self.base_uri, req.url.path());
        let body: Value = if req.body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&req.body).map_err(|e| reject(400, e.to_string()))?
        };

        let root_id = root_capability_id(&url);
        let is_root = verified.capability_id == root_id;
        let mut state = self.state.lock().unwrap();
        if !is_root && !state.delegated.contains(&verified.capability_id) {
            return Err(reject(403, format!("capability {} not valid here", verified.capability_id)));
        }

        if url == self.keys_url() {
            return self.generate(&mut state, &verified, &body);
        }

        let key = state
            .keys
            .get(&url)
            .ok_or_else(|| reject(404, format!("key {url} not found")))?;
        if is_root && key.controller != verified.signer_did {
            return Err((403, "signer does not control this key".into()));
        }
        if body != Value::Null && body["invocationTarget"] != json!(url) {
            return Err((400, "invocationTarget does not match key".into()));
        }

        let op = body["type"].as_str().unwrap_or("");
        let expected_action = match (req.method.as_str(), op) {
            ("GET", _) => "read",
            ("POST", "SignOperation") => "sign",
            ("POST", "VerifyOperation") => "verify",
            ("POST", "WrapKeyOperation") => "wrapKey",
            ("POST", "UnwrapKeyOperation") => "unwrapKey",
            ("POST", "DeriveSecretOperation") => "deriveSecret",
            _ => return Err((400, format!("unsupported operation {op:?}"))),
        };
        if verified.action != expected_action {
            return Err((403, format!("action {} does not match", verified.action)));
        }

        match expected_action {
            "read" => Ok(json!({
                "@context": "https://w3id.org/security/v2",
                "id": url,
                "type": key.key_type,
                "controller": key.controller,
            })),
            "sign" => {
                let data = b64(&body["verifyData"])?;
                Ok(json!({ "signatureValue": URL_SAFE_NO_PAD.encode(sign_with(key, &data)) }))
            }
            "verify" => {
                let data = b64(&body["verifyData"])?;
                let sig = b64(&body["signatureValue"])?;
                let ok = match key.key_type.as_str() {
                    "Ed25519VerificationKey2018" => {
                        let pk = Ed25519KeyPair::from_seed(&key.secret).public_key();
                        Ed25519Signature::from_slice(&sig)
                            .map(|s| pk.verify(&data, &s).is_ok())
                            .unwrap_or(false)
                    }
                    _ => hmac_sha256(&key.secret, &data) == sig,
                };
                Ok(json!({ "verified": ok }))
            }
            "wrapKey" => {
                let plain = b64(&body["unwrappedKey"])?;
                let wrapped = xor_with(&key.secret, &plain);
                Ok(json!({ "wrappedKey": format!("{WRAP_PREFIX}{}", URL_SAFE_NO_PAD.encode(wrapped)) }))
            }
            "unwrapKey" => {
                let wrapped = body["wrappedKey"].as_str().unwrap_or("");
                let unwrapped = wrapped
                    .strip_prefix(WRAP_PREFIX)
                    .and_then(|w| URL_SAFE_NO_PAD.decode(w).ok())
                    .map(|w| URL_SAFE_NO_PAD.encode(xor_with(&key.secret, &w)));
                Ok(json!({ "unwrappedKey": unwrapped }))
            }
            "deriveSecret" => {
                let peer = body["publicKey"]["publicKeyBase58"].as_str().unwrap_or("");
                let mut input = key.secret.to_vec();
                input.extend_from_slice(peer.as_bytes());
                Ok(json!({ "secret": URL_SAFE_NO_PAD.encode(sha256_raw(&input)) }))
            }
            _ => Err((400, "unreachable".into())),
        }
    }

    fn generate(&self, state: &mut State, verified: &Verified, body: &Value) -> Result<Value, (u16, String)> {
        if verified.action != "generateKey" || body["type"] != "GenerateKeyOperation" {
            return Err((403, "expected generateKey".into()));
        }
        let key_type = body["invocationTarget"]["type"]
            .as_str()
            .ok_or_else(|| reject(400, "missing key type"))?
            .to_string();
        let controller = body["invocationTarget"]["controller"]
            .as_str()
            .ok_or_else(|| reject(400, "missing controller"))?
            .to_string();
        if controller != verified.signer_did {
            return Err((403, "controller must sign its own key generation".into()));
        }
        let kms_module = body["kmsModule"].as_str().unwrap_or("").to_string();

        state.next_id += 1;
        let id = format!("{}/k{}", self.keys_url(), state.next_id);
        state.keys.insert(
            id.clone(),
            StoredKey {
                key_type: key_type.clone(),
                controller: controller.clone(),
                secret: sha256_raw(id.as_bytes()),
            },
        );
        Ok(json!({
            "@context": "https://w3id.org/security/v2",
            "id": id,
            "type": key_type,
            "controller": controller,
            "kmsModule": kms_module,
        }))
    }
}

impl Respond for MockKms {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        match self.handle(request) {
            Ok(body) => ResponseTemplate::new(200).set_body_json(body),
            Err((status, message)) => {
                ResponseTemplate::new(status).set_body_json(json!({ "message": message }))
            }
        }
    }
}

fn reject(status: u16, message: impl Into<String>) -> (u16, String) {
    (status, message.into())
}

fn b64(value: &Value) -> Result<Vec<u8>, (u16, String)> {
    value
        .as_str()
        .and_then(|s| URL_SAFE_NO_PAD.decode(s).ok())
        .ok_or_else(|| reject(400, "expected base64url string"))
}

fn sign_with(key: &StoredKey, data: &[u8]) -> Vec<u8> {
    match key.key_type.as_str() {
        "Ed25519VerificationKey2018" => Ed25519KeyPair::from_seed(&key.secret).sign(data).to_vec(),
        _ => hmac_sha256(&key.secret, data),
    }
}

pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn xor_with(key: &[u8; 32], data: &[u8]) -> Vec<u8> {
    data.iter()
        .zip(key.iter().cycle())
        .map(|(d, k)| d ^ k)
        .collect()
}
