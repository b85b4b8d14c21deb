//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with external libraries:
//! - `forest`: smartcore decision-tree ensemble
//! - `artifact`: JSON model file with Ed25519-signed manifest
//! - `dataset`: CSV training data
//! - `sanitize`: redaction for logs

pub mod artifact;
pub mod dataset;
pub mod forest;
pub mod sanitize;

pub use artifact::ArtifactError;
pub use dataset::DatasetError;
