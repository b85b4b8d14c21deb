//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the two flows of the application: training and prediction.

mod prediction;
mod training;

pub use prediction::{positive_class_probability, PredictionService};
pub use training::{TrainingReport, TrainingService};
