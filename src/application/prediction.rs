//! Prediction service: Turns a form submission into a risk diagnosis.
//!
//! This service coordinates:
//! - Encoding the form values into the ordered feature vector
//! - Evaluating the classifier (label and class probabilities)
//! - Extracting the positive-class probability
//! - Risk classification
//!
//! Nothing is cached between submissions.

use std::sync::Arc;

use crate::domain::{Diagnosis, DiagnosisResult, ModelError, PatientInput};
use crate::ports::Classifier;
use crate::HeartRiskError;

/// Pick the "disease present" probability out of a `predict_proba` vector.
///
/// With two classes the positive class is the second entry. A model trained
/// on a single label value yields one entry, which is returned as-is.
///
/// # Errors
/// Returns `ModelError::EmptyProbabilities` for an empty vector.
pub fn positive_class_probability(proba: &[f64]) -> Result<f64, ModelError> {
    match proba {
        [] => Err(ModelError::EmptyProbabilities),
        [_, positive] => Ok(*positive),
        [first, ..] => {
            tracing::warn!(
                "Classifier returned {} class probabilities; using the first as the disease probability",
                proba.len()
            );
            Ok(*first)
        }
    }
}

/// Service for evaluating one case against the trained model.
pub struct PredictionService<C: Classifier> {
    classifier: Arc<C>,
}

impl<C: Classifier> Clone for PredictionService<C> {
    fn clone(&self) -> Self {
        Self {
            classifier: Arc::clone(&self.classifier),
        }
    }
}

impl<C: Classifier> PredictionService<C> {
    /// Create a new prediction service.
    pub fn new(classifier: Arc<C>) -> Self {
        Self { classifier }
    }

    /// Run the prediction flow for one submission.
    ///
    /// # Errors
    /// Returns error if the classifier fails or yields no probabilities. A
    /// probability outside [0, 1] is a `HeartRiskError::Validation`.
    pub fn predict(&self, input: &PatientInput) -> Result<Diagnosis, HeartRiskError> {
        let input = input.clamped();
        let features = input.encode();
        tracing::debug!("Encoded form submission into {} features", features.as_slice().len());

        let prediction = self.classifier.predict(&features)?;
        let proba = self.classifier.predict_proba(&features)?;
        let probability = positive_class_probability(&proba)?;

        if !(0.0..=1.0).contains(&probability) {
            return Err(HeartRiskError::Validation(format!(
                "probability {probability} outside [0, 1]"
            )));
        }

        let diagnosis = Diagnosis::new(input, DiagnosisResult::new(probability, prediction));
        tracing::info!(
            "Prediction complete: class={}, risk={}",
            prediction,
            diagnosis.risk_level
        );
        Ok(diagnosis)
    }
}
