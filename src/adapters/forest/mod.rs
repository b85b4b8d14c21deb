//! Forest adapter: Implementation of Classifier using smartcore decision trees.
//!
//! A bagged ensemble: every estimator is a Gini decision tree fit on a
//! bootstrap sample of the full dataset. Probabilities are the share of
//! estimators voting for each class.
//!
//! # Reproducibility
//!
//! Bootstrap draws come from a ChaCha8 RNG seeded with `ForestParams::seed`,
//! so the same dataset and parameters yield the same ensemble.

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters, SplitCriterion,
};

use crate::domain::{FeatureVector, ModelError, TrainingDataset, FEATURE_COUNT};
use crate::ports::{Classifier, Trainer};

/// Number of estimators used when none is configured.
pub const DEFAULT_N_ESTIMATORS: usize = 100;

/// RNG seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

type Tree = DecisionTreeClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// Ensemble hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of estimators in the ensemble
    pub n_estimators: usize,

    /// Seed for bootstrap sampling
    pub seed: u64,

    /// Depth limit per tree (`None` grows trees until leaves are pure)
    pub max_depth: Option<u16>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            seed: DEFAULT_SEED,
            max_depth: None,
        }
    }
}

impl ForestParams {
    fn tree_parameters(&self) -> DecisionTreeClassifierParameters {
        let params = DecisionTreeClassifierParameters::default().with_criterion(SplitCriterion::Gini);
        match self.max_depth {
            Some(depth) => params.with_max_depth(depth),
            None => params,
        }
    }
}

/// One member of the ensemble.
#[derive(Serialize, Deserialize)]
enum Estimator {
    /// A fitted decision tree
    Tree(Tree),
    /// Bootstrap sample held a single class; always votes for it
    Constant(i32),
}

impl Estimator {
    fn vote(&self, row: &DenseMatrix<f64>) -> Result<i32, ModelError> {
        match self {
            Self::Tree(tree) => {
                let predictions = tree
                    .predict(row)
                    .map_err(|e| ModelError::Prediction(e.to_string()))?;
                predictions
                    .first()
                    .copied()
                    .ok_or_else(|| ModelError::Prediction("tree returned no prediction".into()))
            }
            Self::Constant(label) => Ok(*label),
        }
    }
}

/// A fitted bagged forest.
#[derive(Serialize, Deserialize)]
pub struct RandomForestModel {
    params: ForestParams,
    classes: Vec<i32>,
    estimators: Vec<Estimator>,
    n_training_samples: usize,
    trained_at: DateTime<Utc>,
}

impl std::fmt::Debug for RandomForestModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomForestModel")
            .field("params", &self.params)
            .field("classes", &self.classes)
            .field("estimators", &self.estimators.len())
            .field("n_training_samples", &self.n_training_samples)
            .field("trained_at", &self.trained_at)
            .finish()
    }
}

impl RandomForestModel {
    #[must_use]
    pub fn n_estimators(&self) -> usize {
        self.estimators.len()
    }

    #[must_use]
    pub fn n_training_samples(&self) -> usize {
        self.n_training_samples
    }

    #[must_use]
    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    /// Check structural invariants after deserialization.
    ///
    /// # Errors
    /// Returns `ModelError::Malformed` if the forest has no estimators or its
    /// class list is empty or unsorted.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.estimators.is_empty() {
            return Err(ModelError::Malformed("forest has no estimators".into()));
        }
        if self.classes.is_empty() {
            return Err(ModelError::Malformed("forest has no classes".into()));
        }
        if self.classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ModelError::Malformed(
                "class list must be sorted and unique".into(),
            ));
        }
        Ok(())
    }

    fn row_matrix(features: &FeatureVector) -> DenseMatrix<f64> {
        DenseMatrix::new(1, FEATURE_COUNT, features.to_vec(), false)
    }
}

impl Classifier for RandomForestModel {
    fn classes(&self) -> &[i32] {
        &self.classes
    }

    fn predict(&self, features: &FeatureVector) -> Result<i32, ModelError> {
        let proba = self.predict_proba(features)?;

        // Strict comparison keeps the lower class on ties.
        let mut best = 0;
        for (idx, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = idx;
            }
        }
        Ok(self.classes[best])
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        if self.estimators.is_empty() {
            return Err(ModelError::Malformed("forest has no estimators".into()));
        }

        let row = Self::row_matrix(features);
        let mut votes = vec![0usize; self.classes.len()];
        for estimator in &self.estimators {
            let label = estimator.vote(&row)?;
            let idx = self
                .classes
                .binary_search(&label)
                .map_err(|_| ModelError::UnknownClass(label))?;
            votes[idx] += 1;
        }

        let total = self.estimators.len() as f64;
        Ok(votes.into_iter().map(|v| v as f64 / total).collect())
    }
}

impl Trainer for ForestParams {
    type Model = RandomForestModel;

    fn fit(&self, dataset: &TrainingDataset) -> Result<RandomForestModel, ModelError> {
        if dataset.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        if self.n_estimators == 0 {
            return Err(ModelError::InvalidParameters(
                "n_estimators must be at least 1".into(),
            ));
        }

        let classes = dataset.classes();
        if classes.len() < 2 {
            tracing::warn!(
                "Training set contains a single label value ({:?}); the model will output one probability per case",
                classes
            );
        }

        let n = dataset.len();
        let rows = dataset.rows();
        let labels = dataset.labels();
        let tree_params = self.tree_parameters();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut estimators = Vec::with_capacity(self.n_estimators);

        tracing::info!(
            "Fitting {} estimators on {} samples (seed={})",
            self.n_estimators,
            n,
            self.seed
        );

        for i in 0..self.n_estimators {
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let y: Vec<i32> = sample.iter().map(|&idx| labels[idx]).collect();

            if y.iter().all(|&label| label == y[0]) {
                tracing::debug!("Estimator {i}: single-class bootstrap, using constant vote");
                estimators.push(Estimator::Constant(y[0]));
                continue;
            }

            let mut data = Vec::with_capacity(n * FEATURE_COUNT);
            for &idx in &sample {
                data.extend_from_slice(rows[idx].as_slice());
            }
            let x = DenseMatrix::new(n, FEATURE_COUNT, data, false);

            let tree = Tree::fit(&x, &y, tree_params.clone())
                .map_err(|e| ModelError::Training(format!("estimator {i}: {e}")))?;
            estimators.push(Estimator::Tree(tree));
        }

        Ok(RandomForestModel {
            params: *self,
            classes,
            estimators,
            n_training_samples: n,
            trained_at: Utc::now(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Synthetic cohort where disease is present exactly when age > 55.
    pub(crate) fn age_split_dataset() -> TrainingDataset {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..60 {
            let age = 30.0 + i as f64 * 0.8;
            let chol = 150.0 + ((i * 37) % 200) as f64;
            rows.push(FeatureVector::new([
                age,
                (i % 2) as f64,
                (i % 4) as f64,
                120.0,
                chol,
                0.0,
                0.0,
                150.0,
                0.0,
                1.0,
                1.0,
                0.0,
                2.0,
            ]));
            labels.push(i32::from(age > 55.0));
        }
        TrainingDataset::new(rows, labels).expect("valid dataset")
    }

    fn with_age(age: f64) -> FeatureVector {
        FeatureVector::new([
            age, 0.0, 0.0, 120.0, 250.0, 0.0, 0.0, 150.0, 0.0, 1.0, 1.0, 0.0, 2.0,
        ])
    }

    fn small_params() -> ForestParams {
        ForestParams {
            n_estimators: 25,
            ..ForestParams::default()
        }
    }

    #[test]
    fn test_default_params() {
        let params = ForestParams::default();
        assert_eq!(params.n_estimators, 100);
        assert_eq!(params.seed, 42);
        assert_eq!(params.max_depth, None);
    }

    #[test]
    fn test_fit_separates_classes() {
        let model = small_params().fit(&age_split_dataset()).expect("fit");

        assert_eq!(model.classes(), &[0, 1]);
        assert_eq!(model.n_estimators(), 25);
        assert_eq!(model.n_training_samples(), 60);

        let old = model.predict_proba(&with_age(78.0)).expect("proba");
        let young = model.predict_proba(&with_age(32.0)).expect("proba");
        assert_eq!(old.len(), 2);
        assert!((old.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(old[1] > 0.9, "old patient proba = {old:?}");
        assert!(young[1] < 0.1, "young patient proba = {young:?}");

        assert_eq!(model.predict(&with_age(78.0)).expect("predict"), 1);
        assert_eq!(model.predict(&with_age(32.0)).expect("predict"), 0);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let dataset = age_split_dataset();
        let a = small_params().fit(&dataset).expect("fit");
        let b = small_params().fit(&dataset).expect("fit");

        for age in [35.0, 50.0, 62.0, 70.0] {
            assert_eq!(
                a.predict_proba(&with_age(age)).expect("proba"),
                b.predict_proba(&with_age(age)).expect("proba")
            );
        }
    }

    #[test]
    fn test_single_class_dataset_yields_one_probability() {
        let rows = vec![with_age(40.0), with_age(60.0), with_age(70.0)];
        let dataset = TrainingDataset::new(rows, vec![1, 1, 1]).expect("valid dataset");
        let model = small_params().fit(&dataset).expect("fit");

        assert_eq!(model.classes(), &[1]);
        assert_eq!(model.predict_proba(&with_age(50.0)).expect("proba"), vec![1.0]);
        assert_eq!(model.predict(&with_age(50.0)).expect("predict"), 1);
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let err = ForestParams::default()
            .fit(&TrainingDataset::default())
            .expect_err("must fail");
        assert!(matches!(err, ModelError::EmptyDataset));
    }

    #[test]
    fn test_zero_estimators_rejected() {
        let params = ForestParams {
            n_estimators: 0,
            ..ForestParams::default()
        };
        let err = params.fit(&age_split_dataset()).expect_err("must fail");
        assert!(matches!(err, ModelError::InvalidParameters(_)));
    }

    #[test]
    fn test_validate_rejects_unsorted_classes() {
        let mut model = small_params().fit(&age_split_dataset()).expect("fit");
        assert!(model.validate().is_ok());
        model.classes = vec![1, 0];
        assert!(model.validate().is_err());
    }
}
