//! Feature schema and fixed-order vector construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::Sample;

/// Canonical measurement order for the iris schema.
pub const IRIS_FEATURE_NAMES: [&str; 4] = [
    "sepal_length",
    "sepal_width",
    "petal_length",
    "petal_width",
];

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("expected {expected} feature value(s), got {actual}")]
    Mismatch { expected: usize, actual: usize },
}

/// Ordered list of feature names shared by training and inference.
///
/// Both the dataset loader and the inference path consult this value so that
/// vectors are always aligned the same way; it travels inside the persisted
/// artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    /// The four-measurement iris schema in canonical order.
    pub fn iris() -> Self {
        Self {
            names: IRIS_FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
        }
    }

    /// Rebuild a schema from ordered names (artifact load path).
    pub fn from_ordered(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn feature_count(&self) -> usize {
        self.names.len()
    }

    /// Feature names in vector order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// True when every name resolves against the `Sample` measurement fields.
    pub fn matches_sample_fields(&self) -> bool {
        self.names.len() == IRIS_FEATURE_NAMES.len()
            && self
                .names
                .iter()
                .zip(IRIS_FEATURE_NAMES)
                .all(|(name, canonical)| name == canonical)
    }

    /// Project a loaded sample into the schema's fixed vector order.
    pub fn vector_from_sample(&self, sample: &Sample) -> Vec<f32> {
        self.names
            .iter()
            .filter_map(|name| sample.measurement(name))
            .collect()
    }

    /// Validate raw inference-time values against the declared feature count.
    pub fn vector_from_raw(&self, values: &[f32]) -> Result<Vec<f32>, SchemaError> {
        if values.len() != self.names.len() {
            return Err(SchemaError::Mismatch {
                expected: self.names.len(),
                actual: values.len(),
            });
        }
        Ok(values.to_vec())
    }
}
