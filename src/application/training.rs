//! Training service: Fits the classifier and persists the artifact.

use std::path::PathBuf;

use crate::domain::TrainingDataset;
use crate::ports::{Classifier, ModelRepository, Trainer};
use crate::HeartRiskError;

/// Outcome of a training run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingReport {
    /// Rows the model was fit on
    pub n_samples: usize,

    /// Distinct labels seen, sorted
    pub classes: Vec<i32>,

    /// Where the artifact was written
    pub artifact_path: PathBuf,
}

/// Service for the training flow: fit on the whole dataset, then save.
pub struct TrainingService<T, R>
where
    T: Trainer,
    R: ModelRepository<Model = T::Model>,
{
    trainer: T,
    repository: R,
}

impl<T, R> TrainingService<T, R>
where
    T: Trainer,
    R: ModelRepository<Model = T::Model>,
    HeartRiskError: From<R::Error>,
{
    /// Create a new training service.
    pub fn new(trainer: T, repository: R) -> Self {
        Self {
            trainer,
            repository,
        }
    }

    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Fit a model on `dataset` and write it, replacing any previous artifact.
    ///
    /// # Errors
    /// Returns error if fitting or saving fails. Nothing is written when
    /// fitting fails.
    pub fn train(&self, dataset: &TrainingDataset) -> Result<TrainingReport, HeartRiskError> {
        tracing::info!("Training on {} samples...", dataset.len());

        let model = self.trainer.fit(dataset)?;
        let artifact_path = self.repository.save(&model)?;

        let report = TrainingReport {
            n_samples: dataset.len(),
            classes: model.classes().to_vec(),
            artifact_path,
        };
        tracing::info!(
            "Training complete: classes={:?}, artifact={:?}",
            report.classes,
            report.artifact_path
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifact::{JsonModelStore, SignaturePolicy};
    use crate::adapters::forest::tests::age_split_dataset;
    use crate::adapters::forest::ForestParams;
    use crate::application::PredictionService;
    use crate::domain::{PatientInput, RiskLevel};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn params() -> ForestParams {
        ForestParams {
            n_estimators: 20,
            ..ForestParams::default()
        }
    }

    #[test]
    fn test_train_save_load_predict() {
        let temp = tempdir().expect("tempdir");
        let store = JsonModelStore::new(temp.path().join("models"), SignaturePolicy::AllowUnsigned);
        let service = TrainingService::new(params(), store.clone());

        let report = service.train(&age_split_dataset()).expect("train");
        assert_eq!(report.n_samples, 60);
        assert_eq!(report.classes, vec![0, 1]);
        assert!(report.artifact_path.exists());

        let model = store.load().expect("load");
        let predictor = PredictionService::new(Arc::new(model));

        let older = PatientInput {
            age: 75.0,
            ..PatientInput::default()
        };
        let younger = PatientInput {
            age: 30.0,
            ..PatientInput::default()
        };

        let high = predictor.predict(&older).expect("predict");
        assert_eq!(high.result.prediction, 1);
        assert_eq!(high.risk_level, RiskLevel::High);

        let low = predictor.predict(&younger).expect("predict");
        assert_eq!(low.result.prediction, 0);
        assert_eq!(low.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_failed_fit_writes_nothing() {
        let temp = tempdir().expect("tempdir");
        let store = JsonModelStore::new(temp.path(), SignaturePolicy::AllowUnsigned);
        let service = TrainingService::new(params(), store);

        let err = service
            .train(&TrainingDataset::default())
            .expect_err("must fail");
        assert!(matches!(err, HeartRiskError::Model(_)));
        assert!(!service.repository().exists());
    }
}
