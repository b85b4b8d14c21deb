//! Domain layer: Core business types and logic.
//!
//! Pure types with no I/O: the form selections, the ordered feature vector,
//! training data and diagnosis results.

mod choice;
mod dataset;
mod diagnosis;
mod error;
mod patient;

pub use choice::{ChestPain, Choice, MajorVessels, RestingEcg, Sex, StSlope, Thalassemia, YesNo};
pub use dataset::TrainingDataset;
pub use diagnosis::{
    Diagnosis, DiagnosisResult, RiskLevel, HIGH_RISK_THRESHOLD, MODERATE_RISK_THRESHOLD,
};
pub use error::ModelError;
pub use patient::{
    FeatureVector, NumericRange, PatientInput, AGE_RANGE, CHOLESTEROL_RANGE, FEATURE_COUNT,
    FEATURE_NAMES, LABEL_COLUMN, MAX_HEART_RATE_RANGE, RESTING_BP_RANGE, ST_DEPRESSION_RANGE,
};
