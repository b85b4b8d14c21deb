//! Classifier error type shared by the ports and their adapters.

/// Errors raised while fitting or evaluating a classifier.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Cannot train on an empty dataset")]
    EmptyDataset,

    #[error("Invalid training parameters: {0}")]
    InvalidParameters(String),

    #[error("Training failed: {0}")]
    Training(String),

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Estimator voted for class {0}, which the model was not trained on")]
    UnknownClass(i32),

    #[error("Classifier returned an empty probability vector")]
    EmptyProbabilities,

    #[error("Model is malformed: {0}")]
    Malformed(String),
}
