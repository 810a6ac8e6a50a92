//! Library exports for the iris classifier pipeline.
/// Pipeline configuration loading.
pub mod config;
/// Dataset parsing and deterministic splitting.
pub mod dataset;
/// Prediction engine holding the active model.
pub mod engine;
/// Logging setup.
pub mod logging;
/// Classifier training, inference, and evaluation.
pub mod ml;
/// Versioned model artifact persistence.
pub mod model_store;
/// Session facade consumed by the presentation shell.
pub mod session;
