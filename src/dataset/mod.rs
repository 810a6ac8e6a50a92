//! Labeled measurement records and dataset operations.

pub mod loader;
pub mod split;

pub use loader::{DatasetLoadError, load_dataset};
pub use split::{Split, SplitError, split_dataset};

/// One labeled measurement record: four morphological values plus a species label.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub sepal_length: f32,
    pub sepal_width: f32,
    pub petal_length: f32,
    pub petal_width: f32,
    pub label: String,
}

impl Sample {
    /// Look up a measurement by its schema name.
    pub fn measurement(&self, name: &str) -> Option<f32> {
        match name {
            "sepal_length" => Some(self.sepal_length),
            "sepal_width" => Some(self.sepal_width),
            "petal_length" => Some(self.petal_length),
            "petal_width" => Some(self.petal_width),
            _ => None,
        }
    }
}
