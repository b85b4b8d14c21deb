//! Ed25519 keypair generation utility for model signing.
//!
//! Generates an Ed25519 signing keypair:
//! - Private seed (32 bytes, base64) written to file with 0600 permissions
//! - Public key (base64) optionally written separately
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin generate_keypair -- --out-seed <path> [--out-pub <path>] [--force]
//! ```
//!
//! Point `HEARTRISK_MODEL_SIGNING_KEY_B64_FILE` at the seed for `sign_model`
//! and `HEARTRISK_MODEL_SIGNING_PUBKEY_B64_FILE` at the public key for the
//! predictor.

use std::fs::{self, OpenOptions};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose;
use base64::Engine;
use clap::Parser;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

#[derive(Parser)]
#[command(name = "generate_keypair")]
#[command(about = "Generate an Ed25519 keypair for model signing", long_about = None)]
struct Cli {
    /// Where to write the base64 signing seed
    #[arg(long = "out-seed", alias = "out")]
    out_seed: PathBuf,

    /// Where to write the base64 public key
    #[arg(long = "out-pub")]
    out_pub: Option<PathBuf>,

    /// Overwrite existing files
    #[arg(long)]
    force: bool,
}

fn write_line(path: &Path, contents: &str, mode: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {parent:?}"))?;
    }

    let mut opts = OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        opts.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = opts
        .open(path)
        .with_context(|| format!("Failed to open {path:?}"))?;
    // `mode` only applies on creation; an overwritten file keeps its old bits.
    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("Failed to set permissions on {path:?}"))?;
    file.write_all(contents.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    for path in std::iter::once(&cli.out_seed).chain(cli.out_pub.as_ref()) {
        if path.exists() && !cli.force {
            bail!("Refusing to overwrite existing file {path:?}. Use --force.");
        }
    }

    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);

    let signing_key = SigningKey::from_bytes(&seed);
    let seed_b64 = Zeroizing::new(general_purpose::STANDARD.encode(seed));
    seed.zeroize();
    let pub_b64 = general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes());

    write_line(&cli.out_seed, &seed_b64, 0o600)?;
    println!("Wrote signing seed (base64) to {:?}", cli.out_seed);

    if let Some(pub_path) = &cli.out_pub {
        // Public key is non-secret; allow read access.
        write_line(pub_path, &pub_b64, 0o644)?;
        println!("Wrote public key (base64) to {pub_path:?}");
    }
    println!("Public key (base64)={pub_b64}");

    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_tightens_permissions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("signing.key");
        fs::write(&path, "old").expect("seed file");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("chmod");

        write_line(&path, "new", 0o600).expect("write");

        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(fs::read_to_string(&path).expect("read"), "new\n");
    }
}
