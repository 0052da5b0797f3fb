//! KMS client configuration.
//!
//! Points the client at one keystore on the remote KMS. Override via
//! environment variables or explicit construction for staging/testing.

use url::Url;

/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default validity window of a signed invocation.
pub const DEFAULT_INVOCATION_TTL_SECS: u64 = kmsc_zcap::DEFAULT_INVOCATION_TTL_SECS;

/// Configuration for connecting to a remote keystore.
#[derive(Debug, Clone)]
pub struct KmsClientConfig {
    /// Keystore base URL, e.g. `https://kms.example.com/keystores/z1`.
    /// Generated keys live under `{keystore_url}/keys`.
    pub keystore_url: Url,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Seconds between an invocation's `created` and `expires`.
    pub invocation_ttl_secs: u64,
}

impl KmsClientConfig {
    /// Configuration for `keystore_url` with default timeouts.
    pub fn new(keystore_url: Url) -> Self {
        Self {
            keystore_url,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            invocation_ttl_secs: DEFAULT_INVOCATION_TTL_SECS,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `KMSC_KEYSTORE_URL` (required)
    /// - `KMSC_TIMEOUT_SECS` (default: 30)
    /// - `KMSC_INVOCATION_TTL_SECS` (default: 600)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("KMSC_KEYSTORE_URL").map_err(|_| ConfigError::MissingKeystore)?;
        Ok(Self {
            keystore_url: parse_url("KMSC_KEYSTORE_URL", &raw)?,
            timeout_secs: env_u64("KMSC_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            invocation_ttl_secs: env_u64("KMSC_INVOCATION_TTL_SECS", DEFAULT_INVOCATION_TTL_SECS),
        })
    }

    /// Configuration for a keystore on a local mock server (for testing).
    ///
    /// `base_uri` is the server root, e.g. `http://127.0.0.1:41233`; the
    /// keystore lives at `{base_uri}/keystores/test`.
    pub fn local_mock(base_uri: &str) -> Result<Self, ConfigError> {
        let keystore_url = parse_url(
            "local mock",
            &format!("{}/keystores/test", base_uri.trim_end_matches('/')),
        )?;
        Ok(Self {
            keystore_url,
            timeout_secs: 5,
            invocation_ttl_secs: DEFAULT_INVOCATION_TTL_SECS,
        })
    }

    /// URL of the keystore's key collection.
    pub fn keys_url(&self) -> String {
        format!("{}/keys", self.keystore_url.as_str().trim_end_matches('/'))
    }
}

fn parse_url(source: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(source.to_string(), e.to_string()))?;
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(
            source.to_string(),
            "URL has no host".to_string(),
        ));
    }
    Ok(url)
}

fn env_u64(var: &str, default: u64) -> u64 {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("KMSC_KEYSTORE_URL environment variable is required")]
    MissingKeystore,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
