//! # Key Subcommands
//!
//! `generate-key`, `sign` and `verify` against the configured keystore.
//! Signatures are printed and accepted as unpadded base64url, the encoding
//! the KMS itself uses.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use clap::{Args, ValueEnum};
use serde_json::json;

use kmsc_client::{
    ControllerKey, FromSecretOptions, GenerateKeyOptions, KeyLocator, KmsClient,
};
use kmsc_crypto::SeedCache;

use crate::{read_secret, ControllerArgs, KeystoreArgs};

/// Arguments for `kmsc generate-key`.
#[derive(Args, Debug)]
pub struct GenerateKeyArgs {
    #[command(flatten)]
    pub controller: ControllerArgs,

    #[command(flatten)]
    pub keystore: KeystoreArgs,

    /// Key type: hmac, kek, keyAgreement, Ed25519VerificationKey2018 or a
    /// canonical type string.
    #[arg(long = "type")]
    pub key_type: String,

    /// KMS module that should hold the key.
    #[arg(long, default_value = "ssm-v1")]
    pub kms_module: String,

    /// Key version profile: recommended or fips.
    #[arg(long)]
    pub version: Option<String>,
}

/// Which handle kind a `sign`/`verify` targets.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningKind {
    Hmac,
    Asymmetric,
}

/// Key selection and payload shared by `sign` and `verify`.
#[derive(Args, Debug)]
pub struct KeyOpArgs {
    #[command(flatten)]
    pub controller: ControllerArgs,

    #[command(flatten)]
    pub keystore: KeystoreArgs,

    /// Id of the remote key.
    #[arg(long)]
    pub key_id: String,

    /// Kind of key behind `--key-id`.
    #[arg(long, value_enum, default_value_t = SigningKind::Hmac)]
    pub kind: SigningKind,

    /// Data to operate on, as UTF-8 text.
    #[arg(long, conflicts_with = "data_file", required_unless_present = "data_file")]
    pub data: Option<String>,

    /// Read the data from a file instead.
    #[arg(long)]
    pub data_file: Option<PathBuf>,
}

impl KeyOpArgs {
    fn payload(&self) -> Result<Vec<u8>> {
        match (&self.data, &self.data_file) {
            (Some(data), _) => Ok(data.as_bytes().to_vec()),
            (None, Some(path)) => std::fs::read(path)
                .with_context(|| format!("failed to read {}", path.display())),
            (None, None) => bail!("either --data or --data-file is required"),
        }
    }
}

/// Arguments for `kmsc verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub op: KeyOpArgs,

    /// Signature to check, base64url without padding.
    #[arg(long)]
    pub signature: String,
}

fn controller_key(controller: &ControllerArgs, kms: KmsClient) -> Result<ControllerKey> {
    let secret = read_secret()?;
    // One-shot process: nothing to reuse the seed for.
    let opts = FromSecretOptions::new(secret, controller.handle.as_str())
        .key_name(controller.key_name.as_str())
        .cache(false);
    ControllerKey::from_secret(opts, &SeedCache::with_capacity(0), kms)
        .context("failed to derive controller key")
}

/// Run `kmsc generate-key`.
pub async fn run_generate_key(args: &GenerateKeyArgs) -> Result<u8> {
    let ck = controller_key(&args.controller, args.keystore.client()?)?;
    let mut opts = GenerateKeyOptions::new(&args.key_type, &args.kms_module);
    if let Some(version) = &args.version {
        opts = opts.version(version);
    }
    let key = ck.generate_key(opts).await.context("generateKey failed")?;
    tracing::info!(key_id = %key.id(), key_type = key.type_name(), "generated key");
    let out = json!({
        "id": key.id(),
        "type": key.type_name(),
        "controller": ck.did().as_str(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(0)
}

/// Run `kmsc sign`. Prints the signature.
pub async fn run_sign(args: &KeyOpArgs) -> Result<u8> {
    let data = args.payload()?;
    let ck = controller_key(&args.controller, args.keystore.client()?)?;
    let locator = KeyLocator::new(&args.key_id);
    let signature = match args.kind {
        SigningKind::Hmac => ck.get_hmac(locator)?.sign(&data).await,
        SigningKind::Asymmetric => ck.get_asymmetric_key(locator)?.sign(&data).await,
    }
    .context("sign failed")?;
    println!("{}", URL_SAFE_NO_PAD.encode(signature));
    Ok(0)
}

/// Run `kmsc verify`. Exit code 0 when the signature verifies, 1 otherwise.
pub async fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let data = args.op.payload()?;
    let signature = URL_SAFE_NO_PAD
        .decode(args.signature.trim())
        .map_err(|e| anyhow!("--signature is not base64url: {e}"))?;
    let ck = controller_key(&args.op.controller, args.op.keystore.client()?)?;
    let locator = KeyLocator::new(&args.op.key_id);
    let verified = match args.op.kind {
        SigningKind::Hmac => ck.get_hmac(locator)?.verify(&data, &signature).await,
        SigningKind::Asymmetric => {
            ck.get_asymmetric_key(locator)?
                .verify(&data, &signature)
                .await
        }
    }
    .context("verify failed")?;
    println!("{}", json!({ "verified": verified }));
    Ok(if verified { 0 } else { 1 })
}
