//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (ML library, model files).

mod classifier;
mod model_repository;

pub use classifier::{Classifier, Trainer};
pub use model_repository::ModelRepository;
