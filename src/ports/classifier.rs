//! Classifier port: Traits for fitting and evaluating the risk model.
//!
//! These traits abstract the ensemble implementation (smartcore trees) from
//! the application logic.

use crate::domain::{FeatureVector, ModelError, TrainingDataset};

/// A fitted binary classifier over the 13-feature vector.
pub trait Classifier: Send + Sync {
    /// Class labels known to the model, sorted ascending.
    ///
    /// `predict_proba` returns one entry per class in this order.
    fn classes(&self) -> &[i32];

    /// Predict the class label for one case.
    ///
    /// # Errors
    /// Returns `ModelError::Prediction` if evaluation fails.
    fn predict(&self, features: &FeatureVector) -> Result<i32, ModelError>;

    /// Predict class probabilities for one case.
    ///
    /// A model trained on a single label value returns a one-element vector.
    ///
    /// # Errors
    /// Returns `ModelError::Prediction` if evaluation fails.
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError>;
}

/// Fits a classifier to a labelled dataset.
pub trait Trainer {
    /// The fitted model type.
    type Model: Classifier;

    /// Fit a model to the whole dataset.
    ///
    /// # Errors
    /// Returns `ModelError::EmptyDataset` for an empty dataset and
    /// `ModelError::Training` if fitting fails.
    fn fit(&self, dataset: &TrainingDataset) -> Result<Self::Model, ModelError>;
}
