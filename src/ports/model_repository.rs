//! Model repository port: Trait for persisting the trained model artifact.

use std::path::PathBuf;

use super::Classifier;

/// Persistent home of the trained model.
///
/// The artifact is written once by the training flow and only read
/// afterwards.
pub trait ModelRepository: Send + Sync {
    /// Model type stored by this repository.
    type Model: Classifier;

    /// Error type for repository operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Write the model, replacing any previous artifact.
    ///
    /// # Returns
    /// Path of the written artifact.
    ///
    /// # Errors
    /// Returns error if serialization or the write fails.
    fn save(&self, model: &Self::Model) -> Result<PathBuf, Self::Error>;

    /// Read and validate the model.
    ///
    /// # Errors
    /// Returns error if the artifact is missing, fails verification or does
    /// not match the expected feature layout.
    fn load(&self) -> Result<Self::Model, Self::Error>;

    /// Check whether an artifact exists.
    fn exists(&self) -> bool;
}
