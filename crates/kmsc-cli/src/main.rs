//! # kmsc CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber and
//! dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kmsc_cli::derive::{run_derive, DeriveArgs};
use kmsc_cli::keys::{run_generate_key, run_sign, run_verify, GenerateKeyArgs, KeyOpArgs, VerifyArgs};

/// KMS controller CLI.
///
/// Derives a controller identity from a local secret and uses it to create
/// and operate keys held by a remote KMS.
#[derive(Parser, Debug)]
#[command(name = "kmsc", version, about, long_about = None)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the controller did:key and key id for a secret and handle.
    Derive(DeriveArgs),

    /// Generate a key in the keystore, controlled by the derived identity.
    GenerateKey(GenerateKeyArgs),

    /// Sign data with an HMAC or Ed25519 key.
    Sign(KeyOpArgs),

    /// Verify a signature with an HMAC or Ed25519 key.
    Verify(VerifyArgs),
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let result = match &cli.command {
        Commands::Derive(args) => run_derive(args),
        Commands::GenerateKey(args) => run_generate_key(args).await,
        Commands::Sign(args) => run_sign(args).await,
        Commands::Verify(args) => run_verify(args).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
