//! # kmsc-cli — Operator Tool for the KMS Controller
//!
//! Provides the `kmsc` command-line interface:
//!
//! - `kmsc derive`: Print the controller `did:key` and key id for a
//!   secret and handle. Offline.
//! - `kmsc generate-key`: Create a key in the configured keystore.
//! - `kmsc sign` / `kmsc verify`: HMAC or Ed25519 operations on an
//!   existing key.
//!
//! The secret is taken from `KMSC_SECRET` or, when unset, from the first
//! line of stdin. There is no `--secret` flag.
//!
//! ```bash
//! KMSC_SECRET=pw kmsc derive --handle alice
//! echo pw | kmsc generate-key --handle alice --type hmac --keystore https://kms.example/keystores/z1
//! ```

pub mod derive;
pub mod keys;

use std::io::BufRead;

use anyhow::{bail, Context, Result};
use clap::Args;
use url::Url;

use kmsc_client::{KmsClient, KmsClientConfig};
use kmsc_crypto::{Secret, DEFAULT_KEY_NAME};

/// Environment variable holding the controller secret.
pub const SECRET_ENV: &str = "KMSC_SECRET";

/// Controller identity selection shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ControllerArgs {
    /// Handle the secret is salted with (e.g. a user or device name).
    #[arg(long)]
    pub handle: String,

    /// Name of the derived controller key.
    #[arg(long, default_value = DEFAULT_KEY_NAME)]
    pub key_name: String,
}

/// Remote keystore settings. Each flag falls back to its env variable.
#[derive(Args, Debug, Clone)]
pub struct KeystoreArgs {
    /// Keystore base URL.
    #[arg(long, env = "KMSC_KEYSTORE_URL")]
    pub keystore: Url,

    /// HTTP timeout in seconds.
    #[arg(long, env = "KMSC_TIMEOUT_SECS", default_value_t = kmsc_client::config::DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Validity window of each signed invocation, in seconds.
    #[arg(
        long,
        env = "KMSC_INVOCATION_TTL_SECS",
        default_value_t = kmsc_client::config::DEFAULT_INVOCATION_TTL_SECS
    )]
    pub invocation_ttl_secs: u64,
}

impl KeystoreArgs {
    /// Client configuration for these settings.
    pub fn config(&self) -> KmsClientConfig {
        KmsClientConfig {
            keystore_url: self.keystore.clone(),
            timeout_secs: self.timeout_secs,
            invocation_ttl_secs: self.invocation_ttl_secs,
        }
    }

    /// Build the KMS client.
    pub fn client(&self) -> Result<KmsClient> {
        KmsClient::new(self.config()).context("failed to build KMS client")
    }
}

/// Resolve the controller secret: `env_value` when set, else one line of
/// `stdin` with its line terminator stripped.
pub fn resolve_secret(env_value: Option<String>, mut stdin: impl BufRead) -> Result<Secret> {
    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        return Ok(Secret::from(value));
    }
    let mut line = String::new();
    stdin
        .read_line(&mut line)
        .context("failed to read secret from stdin")?;
    let secret = line.trim_end_matches(['\r', '\n']);
    if secret.is_empty() {
        bail!("no secret given: set {SECRET_ENV} or pipe it on stdin");
    }
    Ok(Secret::from(secret))
}

/// [`resolve_secret`] against the real process environment and stdin.
pub fn read_secret() -> Result<Secret> {
    resolve_secret(std::env::var(SECRET_ENV).ok(), std::io::stdin().lock())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_secret_wins_over_stdin() {
        let secret = resolve_secret(Some("pw".into()), "other\n".as_bytes()).unwrap();
        assert_eq!(secret.as_bytes(), b"pw");
    }

    #[test]
    fn stdin_line_terminator_is_stripped() {
        let secret = resolve_secret(None, "pw\r\nignored\n".as_bytes()).unwrap();
        assert_eq!(secret.as_bytes(), b"pw");
    }

    #[test]
    fn empty_env_falls_back_to_stdin() {
        let secret = resolve_secret(Some(String::new()), "pw\n".as_bytes()).unwrap();
        assert_eq!(secret.as_bytes(), b"pw");
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = resolve_secret(None, "".as_bytes()).unwrap_err();
        assert!(err.to_string().contains(SECRET_ENV));
    }

    #[test]
    fn keystore_args_map_to_config() {
        let args = KeystoreArgs {
            keystore: Url::parse("https://kms.example/keystores/z1").unwrap(),
            timeout_secs: 5,
            invocation_ttl_secs: 120,
        };
        let config = args.config();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.invocation_ttl_secs, 120);
        assert_eq!(config.keys_url(), "https://kms.example/keystores/z1/keys");
    }
}
