//! Signed manifests for model artifacts.
//!
//! `manifest.json` binds every artifact file by SHA-256; `model.sig` is an
//! Ed25519 signature over the exact manifest bytes.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{ArtifactError, MODEL_FILE_NAME};

/// Manifest file name inside the model directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Signature file name inside the model directory.
pub const SIGNATURE_FILE_NAME: &str = "model.sig";

/// Path of a base64 Ed25519 public key used to verify manifests.
pub const PUBKEY_FILE_ENV: &str = "HEARTRISK_MODEL_SIGNING_PUBKEY_B64_FILE";

/// Inline base64 Ed25519 public key, checked after `PUBKEY_FILE_ENV`.
pub const PUBKEY_ENV: &str = "HEARTRISK_MODEL_SIGNING_PUBKEY_B64";

/// Allowed clock skew for `created_at` in the future.
const MAX_CLOCK_SKEW_SECS: i64 = 300;

/// Outcome of a successful verification.
///
/// `model_bytes` is the exact `heart_model.json` content whose hash matched,
/// so callers deserialize what was checked rather than re-reading the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedModel {
    pub manifest: SignedManifest,
    pub model_bytes: Vec<u8>,
}

/// Signed list of artifact files and their hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedManifest {
    pub version: u32,
    /// Monotonic serial number (a CI build number, or `created_at` by default).
    pub serial: u64,
    /// Unix timestamp (seconds) when the manifest was created.
    pub created_at: i64,
    /// Random 16-byte nonce, base64.
    pub nonce_b64: String,
    /// Relative file name -> lowercase hex SHA-256.
    pub files: BTreeMap<String, String>,
}

/// Whether an artifact without a manifest may be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignaturePolicy {
    /// Refuse unsigned artifacts.
    Required,
    /// Load unsigned artifacts with a warning. Signed ones are still verified.
    AllowUnsigned,
}

impl SignaturePolicy {
    /// Environment variable that opts into loading unsigned artifacts.
    pub const ALLOW_UNSIGNED_ENV: &'static str = "HEARTRISK_ALLOW_UNSIGNED_MODELS";

    #[must_use]
    pub fn from_allow_unsigned(allow: bool) -> Self {
        if allow {
            Self::AllowUnsigned
        } else {
            Self::Required
        }
    }
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn constant_time_eq_str(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn read_file(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn signature_error(msg: impl Into<String>) -> ArtifactError {
    ArtifactError::Signature(msg.into())
}

/// Generate a fresh random nonce for a manifest.
#[must_use]
pub fn make_nonce_b64() -> String {
    let mut nonce = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    base64::engine::general_purpose::STANDARD.encode(nonce)
}

fn validate_nonce_b64(nonce_b64: &str) -> Result<(), ArtifactError> {
    let raw = base64::engine::general_purpose::STANDARD
        .decode(nonce_b64.trim())
        .map_err(|e| signature_error(format!("Invalid nonce base64: {e}")))?;
    if raw.len() != 16 {
        return Err(signature_error("nonce must decode to exactly 16 bytes"));
    }
    Ok(())
}

/// Decode a base64 Ed25519 public key.
///
/// # Errors
/// Returns `ArtifactError::Signature` if the key is not valid base64 or not
/// 32 bytes.
pub fn verifying_key_from_b64(b64: &str) -> Result<VerifyingKey, ArtifactError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|_| signature_error("Invalid public key base64"))?;
    let key: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| signature_error("Invalid public key length (expected 32 bytes)"))?;
    VerifyingKey::from_bytes(&key).map_err(|_| signature_error("Invalid verifying key"))
}

/// Load the verifying key from the environment, if one is configured.
///
/// # Errors
/// Returns error if a configured key cannot be read or decoded.
pub fn verifying_key_from_env() -> Result<Option<VerifyingKey>, ArtifactError> {
    if let Ok(path) = std::env::var(PUBKEY_FILE_ENV) {
        let path = PathBuf::from(path.trim());
        let b64 = fs::read_to_string(&path).map_err(|source| ArtifactError::Io { path, source })?;
        return verifying_key_from_b64(&b64).map(Some);
    }
    if let Ok(b64) = std::env::var(PUBKEY_ENV) {
        return verifying_key_from_b64(&b64).map(Some);
    }
    Ok(None)
}

/// Hash the artifact in `model_dir`, write `manifest.json` and sign it.
///
/// # Errors
/// Returns error if the model file is missing or a file cannot be written.
pub fn sign_model_dir(
    model_dir: &Path,
    signing_key: &SigningKey,
    serial: Option<u64>,
    nonce_b64: Option<String>,
) -> Result<SignedManifest, ArtifactError> {
    let model_bytes = read_file(&model_dir.join(MODEL_FILE_NAME))?;

    let mut files = BTreeMap::new();
    files.insert(MODEL_FILE_NAME.to_string(), sha256_hex(&model_bytes));

    let created_at = unix_now();
    let nonce_b64 = match nonce_b64 {
        Some(n) => {
            validate_nonce_b64(&n)?;
            n
        }
        None => make_nonce_b64(),
    };

    let manifest = SignedManifest {
        version: 1,
        serial: serial.unwrap_or_else(|| created_at.max(1) as u64),
        created_at,
        nonce_b64,
        files,
    };
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)?;

    let manifest_path = model_dir.join(MANIFEST_FILE_NAME);
    fs::write(&manifest_path, &manifest_bytes).map_err(|source| ArtifactError::Io {
        path: manifest_path,
        source,
    })?;

    let signature: Signature = signing_key.sign(&manifest_bytes);
    let sig_path = model_dir.join(SIGNATURE_FILE_NAME);
    fs::write(&sig_path, signature.to_bytes()).map_err(|source| ArtifactError::Io {
        path: sig_path,
        source,
    })?;

    tracing::info!(
        "Signed model manifest (serial={}, files={})",
        manifest.serial,
        manifest.files.len()
    );
    Ok(manifest)
}

/// Check whether `model_dir` carries a manifest and signature.
#[must_use]
pub fn is_signed(model_dir: &Path) -> bool {
    model_dir.join(MANIFEST_FILE_NAME).exists() && model_dir.join(SIGNATURE_FILE_NAME).exists()
}

/// Verify the manifest signature and every bound file hash.
///
/// # Errors
/// Returns `ArtifactError::Signature` on any verification failure and
/// `ArtifactError::Io` if a bound file cannot be read.
pub fn verify_model_dir(
    model_dir: &Path,
    public_key: &VerifyingKey,
) -> Result<VerifiedModel, ArtifactError> {
    let sig_bytes = read_file(&model_dir.join(SIGNATURE_FILE_NAME))?;
    let sig_array: [u8; 64] = sig_bytes
        .as_slice()
        .try_into()
        .map_err(|_| signature_error("Invalid signature length (expected 64 bytes)"))?;
    let signature = Signature::from_bytes(&sig_array);

    let manifest_content = read_file(&model_dir.join(MANIFEST_FILE_NAME))?;
    public_key
        .verify(&manifest_content, &signature)
        .map_err(|_| signature_error("Invalid model signature"))?;

    let manifest: SignedManifest = serde_json::from_slice(&manifest_content)
        .map_err(|e| signature_error(format!("Invalid manifest.json format: {e}")))?;
    if manifest.version != 1 {
        return Err(signature_error(format!(
            "Unsupported manifest version: {}",
            manifest.version
        )));
    }
    validate_nonce_b64(&manifest.nonce_b64)?;

    if manifest.created_at > unix_now() + MAX_CLOCK_SKEW_SECS {
        return Err(signature_error("manifest created_at is in the future"));
    }

    if !manifest.files.contains_key(MODEL_FILE_NAME) {
        return Err(signature_error(format!(
            "manifest.json must bind {MODEL_FILE_NAME}"
        )));
    }

    let mut model_bytes = Vec::new();
    for (rel, expected_hex) in &manifest.files {
        let bytes = read_file(&model_dir.join(rel))?;
        if !constant_time_eq_str(&sha256_hex(&bytes), expected_hex) {
            return Err(signature_error(format!("File hash mismatch for {rel}")));
        }
        if rel == MODEL_FILE_NAME {
            model_bytes = bytes;
        }
    }

    tracing::info!("Model signature and hashes verified successfully");
    Ok(VerifiedModel {
        manifest,
        model_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_signing_key() -> SigningKey {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        SigningKey::from_bytes(&seed)
    }

    #[test]
    fn test_sign_then_verify() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        fs::write(dir.join(MODEL_FILE_NAME), b"{\"model\":1}").expect("write model");

        let key = test_signing_key();
        let manifest = sign_model_dir(dir, &key, Some(7), None).expect("sign");
        assert_eq!(manifest.serial, 7);
        assert!(is_signed(dir));

        let verified = verify_model_dir(dir, &key.verifying_key()).expect("verify");
        assert_eq!(verified.manifest, manifest);
        assert_eq!(verified.model_bytes, b"{\"model\":1}");
    }

    #[test]
    fn test_tampered_model_fails_hash_check() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        fs::write(dir.join(MODEL_FILE_NAME), b"original").expect("write model");

        let key = test_signing_key();
        sign_model_dir(dir, &key, None, None).expect("sign");
        fs::write(dir.join(MODEL_FILE_NAME), b"tampered").expect("rewrite model");

        let err = verify_model_dir(dir, &key.verifying_key()).expect_err("must fail");
        assert!(err.to_string().contains("hash mismatch"));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        fs::write(dir.join(MODEL_FILE_NAME), b"model").expect("write model");

        sign_model_dir(dir, &test_signing_key(), None, None).expect("sign");
        let err = verify_model_dir(dir, &test_signing_key().verifying_key())
            .expect_err("must fail");
        assert!(err.to_string().contains("Invalid model signature"));
    }

    #[test]
    fn test_invalid_nonce_rejected() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        fs::write(dir.join(MODEL_FILE_NAME), b"model").expect("write model");

        let err = sign_model_dir(dir, &test_signing_key(), None, Some("c2hvcnQ=".into()))
            .expect_err("short nonce must fail");
        assert!(err.to_string().contains("16 bytes"));
    }

    #[test]
    fn test_verifying_key_round_trip_through_base64() {
        let key = test_signing_key().verifying_key();
        let b64 = base64::engine::general_purpose::STANDARD.encode(key.to_bytes());
        assert_eq!(verifying_key_from_b64(&b64).expect("decode"), key);
        assert!(verifying_key_from_b64("AAAA").is_err());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq_str("abc", "abc"));
        assert!(!constant_time_eq_str("abc", "abd"));
        assert!(!constant_time_eq_str("abc", "abcd"));
    }
}
