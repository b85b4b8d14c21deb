//! Model signing utility for heartrisk artifacts.
//!
//! Creates a signed manifest (`manifest.json`) and Ed25519 signature
//! (`model.sig`) for `heart_model.json`, verified at load time.
//!
//! # Usage
//!
//! ```bash
//! HEARTRISK_MODEL_SIGNING_KEY_B64_FILE=signing.key \
//!     cargo run --bin sign_model -- models [--serial <n>] [--nonce-b64 <b64>]
//! ```
//!
//! # Security
//!
//! - Signing seed read from a file (env var fallback only in debug builds)
//! - Seed material zeroized after use

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose;
use base64::Engine;
use clap::Parser;
use ed25519_dalek::SigningKey;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use heartrisk::adapters::artifact::signing;

const KEY_FILE_ENV: &str = "HEARTRISK_MODEL_SIGNING_KEY_B64_FILE";
const KEY_ENV: &str = "HEARTRISK_MODEL_SIGNING_KEY_B64";

#[derive(Parser)]
#[command(name = "sign_model")]
#[command(about = "Sign a heartrisk model directory", long_about = None)]
struct Cli {
    /// Directory holding heart_model.json (or the file itself)
    #[arg(value_name = "MODEL_DIR")]
    model_dir: PathBuf,

    /// Monotonic serial number (defaults to the creation timestamp)
    #[arg(long)]
    serial: Option<u64>,

    /// Base64 of a 16-byte nonce (random when omitted)
    #[arg(long = "nonce-b64")]
    nonce_b64: Option<String>,
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct Seed([u8; 32]);

fn read_signing_seed_b64() -> Result<Zeroizing<String>> {
    let secret = if let Ok(path) = env::var(KEY_FILE_ENV) {
        let content = Zeroizing::new(
            fs::read_to_string(path.trim()).context("Failed reading signing key file")?,
        );
        Zeroizing::new(content.trim().to_string())
    } else if cfg!(debug_assertions) {
        // Dev-only fallback for convenience.
        let v = Zeroizing::new(env::var(KEY_ENV).map_err(|_| {
            anyhow!("Missing signing key. Set {KEY_FILE_ENV} (or {KEY_ENV} in debug builds).")
        })?);
        Zeroizing::new(v.trim().to_string())
    } else {
        bail!("Missing signing key. Set {KEY_FILE_ENV}.");
    };

    if secret.is_empty() {
        bail!("Empty signing key");
    }
    Ok(secret)
}

fn read_signing_seed() -> Result<Seed> {
    let b64 = read_signing_seed_b64()?;
    let raw = Zeroizing::new(
        general_purpose::STANDARD
            .decode(b64.as_bytes())
            .context("Invalid base64 in signing key")?,
    );

    let seed: [u8; 32] = raw.as_slice().try_into().map_err(|_| {
        anyhow!(
            "Signing key seed must be 32 bytes after base64 decode (got {})",
            raw.len()
        )
    })?;
    Ok(Seed(seed))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let model_dir = if cli.model_dir.is_file() {
        cli.model_dir
            .parent()
            .ok_or_else(|| anyhow!("Model path has no parent directory"))?
            .to_path_buf()
    } else {
        cli.model_dir
    };

    let seed = read_signing_seed()?;
    let signing_key = SigningKey::from_bytes(&seed.0);
    drop(seed);

    let manifest = signing::sign_model_dir(&model_dir, &signing_key, cli.serial, cli.nonce_b64)
        .with_context(|| format!("Failed to sign {model_dir:?}"))?;

    println!(
        "Signed manifest: {:?} (serial {})",
        model_dir.join(signing::MANIFEST_FILE_NAME),
        manifest.serial
    );
    println!(
        "Wrote signature: {:?}",
        model_dir.join(signing::SIGNATURE_FILE_NAME)
    );
    println!(
        "Public key (base64)={}",
        general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes())
    );

    Ok(())
}
