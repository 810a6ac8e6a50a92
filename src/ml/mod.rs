//! Classifier training, inference, and evaluation.

pub mod features;
pub mod labels;
pub mod metrics;
pub mod softmax;
