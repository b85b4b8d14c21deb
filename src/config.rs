//! Runtime configuration from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `HEARTRISK_MODEL_PATH` | `models` |
//! | `HEARTRISK_LOG_MODE` | `auto` (`file` on a terminal, else `stdout`) |
//! | `HEARTRISK_LOG_FILE` | `heartrisk.log` |
//! | `HEARTRISK_ALLOW_UNSIGNED_MODELS` | `false` |
//! | `HEARTRISK_MODEL_SIGNING_PUBKEY_B64_FILE` / `_B64` | unset |

use std::path::PathBuf;

use crate::adapters::artifact::{signing, ArtifactError, JsonModelStore, SignaturePolicy};

pub const MODEL_PATH_ENV: &str = "HEARTRISK_MODEL_PATH";
pub const LOG_MODE_ENV: &str = "HEARTRISK_LOG_MODE";
pub const LOG_FILE_ENV: &str = "HEARTRISK_LOG_FILE";

pub const DEFAULT_MODEL_PATH: &str = "models";
pub const DEFAULT_LOG_FILE: &str = "heartrisk.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File when stdout is a terminal, stdout otherwise
    #[default]
    Auto,
    File,
    Stdout,
}

impl LogMode {
    /// Parse a mode name; unknown values fall back to `Auto`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            "auto" => Self::Auto,
            other => {
                tracing::warn!("Unknown log mode {other:?}, using auto");
                Self::Auto
            }
        }
    }

    /// Resolve to "log to a file?" given whether stdout is interactive.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "TRUE" | "yes" | "YES")
}

/// Application settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub model_dir: PathBuf,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    pub signature_policy: SignaturePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_PATH),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            signature_policy: SignaturePolicy::Required,
        }
    }
}

impl AppConfig {
    /// Read settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            model_dir: lookup(MODEL_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            log_mode: lookup(LOG_MODE_ENV)
                .map(|v| LogMode::parse(&v))
                .unwrap_or(defaults.log_mode),
            log_file: lookup(LOG_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
            signature_policy: SignaturePolicy::from_allow_unsigned(
                lookup(SignaturePolicy::ALLOW_UNSIGNED_ENV)
                    .map(|v| parse_bool(&v))
                    .unwrap_or(false),
            ),
        }
    }

    /// Model store for `model_dir`, verifying against the configured public key.
    ///
    /// # Errors
    /// Returns error if a configured public key cannot be read or decoded.
    pub fn model_store(&self) -> Result<JsonModelStore, ArtifactError> {
        let key = signing::verifying_key_from_env()?;
        Ok(JsonModelStore::new(&self.model_dir, self.signature_policy).with_verifying_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.model_dir, PathBuf::from("models"));
        assert_eq!(config.signature_policy, SignaturePolicy::Required);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HEARTRISK_MODEL_PATH", "/srv/models"),
            ("HEARTRISK_LOG_MODE", "stdout"),
            ("HEARTRISK_LOG_FILE", "/tmp/hr.log"),
            ("HEARTRISK_ALLOW_UNSIGNED_MODELS", "true"),
        ]));
        assert_eq!(config.model_dir, PathBuf::from("/srv/models"));
        assert_eq!(config.log_mode, LogMode::Stdout);
        assert_eq!(config.log_file, PathBuf::from("/tmp/hr.log"));
        assert_eq!(config.signature_policy, SignaturePolicy::AllowUnsigned);
    }

    #[test]
    fn test_allow_unsigned_requires_truthy_value() {
        let config = AppConfig::from_lookup(lookup(&[("HEARTRISK_ALLOW_UNSIGNED_MODELS", "no")]));
        assert_eq!(config.signature_policy, SignaturePolicy::Required);
    }

    #[test]
    fn test_log_mode_resolution() {
        assert_eq!(LogMode::parse("FILE"), LogMode::File);
        assert_eq!(LogMode::parse("bogus"), LogMode::Auto);
        assert!(LogMode::Auto.use_file(true));
        assert!(!LogMode::Auto.use_file(false));
        assert!(LogMode::File.use_file(false));
        assert!(!LogMode::Stdout.use_file(true));
    }
}
