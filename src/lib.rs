//! # heartrisk
//!
//! Heart disease risk estimation from 13 clinical features.
//!
//! This crate provides:
//! - A training flow that fits a tree ensemble on a labelled CSV and writes a
//!   model artifact
//! - A prediction flow that encodes a form submission, evaluates the model
//!   and classifies the probability into low / moderate / high risk
//! - Terminal UI for the prediction form
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (PatientInput, FeatureVector, Diagnosis)
//! - `ports`: Trait definitions for the classifier and model storage
//! - `adapters`: Concrete implementations (smartcore forest, JSON artifact, CSV)
//! - `application`: Training and prediction use cases
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
pub mod tui;

pub use domain::{Diagnosis, PatientInput, RiskLevel};

/// Result type for heartrisk operations
pub type Result<T> = std::result::Result<T, HeartRiskError>;

/// Main error type for heartrisk
#[derive(Debug, thiserror::Error)]
pub enum HeartRiskError {
    #[error("Model error: {0}")]
    Model(#[from] domain::ModelError),

    #[error("Model artifact error: {0}")]
    Artifact(#[from] adapters::ArtifactError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] adapters::DatasetError),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
