//! # Derive Subcommand
//!
//! Prints the controller identity a secret and handle derive to. Never
//! contacts the KMS and never caches the seed.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};

use kmsc_core::Handle;
use kmsc_crypto::{derive_key, salted_seed, Secret, DERIVED_KEY_TYPE};

use crate::{read_secret, ControllerArgs};

/// Arguments for `kmsc derive`.
#[derive(Args, Debug)]
pub struct DeriveArgs {
    #[command(flatten)]
    pub controller: ControllerArgs,
}

/// Describe the controller identity for `secret` under `controller`.
pub fn describe_controller(secret: &Secret, controller: &ControllerArgs) -> Result<Value> {
    let handle = Handle::from(controller.handle.as_str());
    let seed = salted_seed(secret, &handle);
    let derived = derive_key(&seed, &controller.key_name)
        .with_context(|| format!("failed to derive key {:?}", controller.key_name))?;
    Ok(json!({
        "handle": handle.as_str(),
        "keyName": controller.key_name,
        "did": derived.public_id().as_str(),
        "id": derived.verification_method(),
        "type": DERIVED_KEY_TYPE,
    }))
}

/// Run `kmsc derive`.
pub fn run_derive(args: &DeriveArgs) -> Result<u8> {
    let secret = read_secret()?;
    let identity = describe_controller(&secret, &args.controller)?;
    println!("{}", serde_json::to_string_pretty(&identity)?);
    Ok(0)
}
