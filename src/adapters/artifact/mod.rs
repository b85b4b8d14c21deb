//! Artifact adapter: Implementation of ModelRepository as a JSON file.
//!
//! The trained forest is stored as `heart_model.json` together with the
//! feature-name contract it was trained under. Loading refuses an artifact
//! whose feature names differ from `FEATURE_NAMES`, since the forest indexes
//! features by position.
//!
//! # Security
//!
//! Artifacts can be signed (see [`signing`]). Under
//! `SignaturePolicy::Required` an unsigned artifact is rejected; a signed
//! one is always verified when a public key is configured.

pub mod signing;

use std::fs;
use std::path::{Path, PathBuf};

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapters::forest::RandomForestModel;
use crate::domain::{ModelError, FEATURE_NAMES, LABEL_COLUMN};
use crate::ports::ModelRepository;

pub use signing::SignaturePolicy;

/// File name of the serialized model inside the model directory.
pub const MODEL_FILE_NAME: &str = "heart_model.json";

/// Artifact format version written by this build.
pub const ARTIFACT_VERSION: u32 = 1;

/// Errors raised while saving or loading a model artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("No trained model at {0}; run train_model first")]
    NotFound(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed model artifact: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Unsupported artifact version {0} (expected {ARTIFACT_VERSION})")]
    UnsupportedVersion(u32),

    #[error("Feature names do not match: expected {expected:?}, found {found:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Unexpected label column {0:?} (expected \"{LABEL_COLUMN}\")")]
    LabelColumn(String),

    #[error("Signature check failed: {0}")]
    Signature(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Serialize)]
struct ArtifactRef<'a> {
    version: u32,
    feature_names: Vec<String>,
    label_column: &'a str,
    model: &'a RandomForestModel,
}

#[derive(Deserialize)]
struct Artifact {
    version: u32,
    feature_names: Vec<String>,
    label_column: String,
    model: RandomForestModel,
}

fn expected_feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect()
}

/// Model store rooted at a directory.
#[derive(Debug, Clone)]
pub struct JsonModelStore {
    dir: PathBuf,
    policy: SignaturePolicy,
    verifying_key: Option<VerifyingKey>,
}

impl JsonModelStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, policy: SignaturePolicy) -> Self {
        Self {
            dir: dir.into(),
            policy,
            verifying_key: None,
        }
    }

    /// Verify signed artifacts against `key`.
    #[must_use]
    pub fn with_verifying_key(mut self, key: Option<VerifyingKey>) -> Self {
        self.verifying_key = key;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE_NAME)
    }

    fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ArtifactError + '_ {
        move |source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Apply the signature policy. Returns the verified model bytes when a
    /// signature was checked, `None` when verification was skipped.
    fn check_signature(&self) -> Result<Option<Vec<u8>>, ArtifactError> {
        if !signing::is_signed(&self.dir) {
            return match self.policy {
                SignaturePolicy::Required => {
                    tracing::error!(
                        "Model signature not found in {:?}. Set {}=true to load unsigned models.",
                        self.dir,
                        SignaturePolicy::ALLOW_UNSIGNED_ENV
                    );
                    Err(ArtifactError::Signature(format!(
                        "model signature required; set {}=true to load unsigned models",
                        SignaturePolicy::ALLOW_UNSIGNED_ENV
                    )))
                }
                SignaturePolicy::AllowUnsigned => {
                    tracing::warn!("Loading UNSIGNED model from {:?}", self.dir);
                    Ok(None)
                }
            };
        }

        match (&self.verifying_key, self.policy) {
            (Some(key), _) => {
                signing::verify_model_dir(&self.dir, key).map(|verified| Some(verified.model_bytes))
            }
            (None, SignaturePolicy::Required) => Err(ArtifactError::Signature(format!(
                "model is signed but no public key is configured (set {})",
                signing::PUBKEY_FILE_ENV
            ))),
            (None, SignaturePolicy::AllowUnsigned) => {
                tracing::warn!("Model is signed but no public key is configured; skipping verification");
                Ok(None)
            }
        }
    }

    fn remove_stale_signature(&self) -> Result<(), ArtifactError> {
        for name in [signing::MANIFEST_FILE_NAME, signing::SIGNATURE_FILE_NAME] {
            let path = self.dir.join(name);
            if path.exists() {
                tracing::warn!("Removing stale {:?}; re-sign the new model", path);
                fs::remove_file(&path).map_err(Self::io_error(&path))?;
            }
        }
        Ok(())
    }
}

impl ModelRepository for JsonModelStore {
    type Model = RandomForestModel;
    type Error = ArtifactError;

    fn save(&self, model: &RandomForestModel) -> Result<PathBuf, ArtifactError> {
        fs::create_dir_all(&self.dir).map_err(Self::io_error(&self.dir))?;
        self.remove_stale_signature()?;

        let artifact = ArtifactRef {
            version: ARTIFACT_VERSION,
            feature_names: expected_feature_names(),
            label_column: LABEL_COLUMN,
            model,
        };
        let bytes = serde_json::to_vec(&artifact)?;

        let path = self.model_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).map_err(Self::io_error(&tmp))?;
        fs::rename(&tmp, &path).map_err(Self::io_error(&path))?;

        tracing::info!(
            "Saved model to {:?} ({} estimators, {} bytes)",
            path,
            model.n_estimators(),
            bytes.len()
        );
        Ok(path)
    }

    fn load(&self) -> Result<RandomForestModel, ArtifactError> {
        let path = self.model_path();
        if !path.exists() {
            return Err(ArtifactError::NotFound(path));
        }

        let content = match self.check_signature()? {
            Some(verified) => verified,
            None => fs::read(&path).map_err(Self::io_error(&path))?,
        };
        let artifact: Artifact = serde_json::from_slice(&content)?;

        if artifact.version != ARTIFACT_VERSION {
            return Err(ArtifactError::UnsupportedVersion(artifact.version));
        }
        let expected = expected_feature_names();
        if artifact.feature_names != expected {
            return Err(ArtifactError::FeatureMismatch {
                expected,
                found: artifact.feature_names,
            });
        }
        if artifact.label_column != LABEL_COLUMN {
            return Err(ArtifactError::LabelColumn(artifact.label_column));
        }
        artifact.model.validate()?;

        tracing::info!(
            "Loaded model from {:?} ({} estimators, trained {})",
            path,
            artifact.model.n_estimators(),
            artifact.model.trained_at().format("%Y-%m-%d %H:%M")
        );
        Ok(artifact.model)
    }

    fn exists(&self) -> bool {
        self.model_path().exists()
    }
}
