//! Bidirectional mapping between species labels and dense class indices.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabelError {
    /// A classifier over fewer than two classes is undefined.
    #[error("training data contains {found} distinct class(es); at least 2 are required")]
    InsufficientClasses { found: usize },
    /// A label unseen at fit time must never appear at serving time.
    #[error("label {0:?} was not seen when the label map was fitted")]
    Unknown(String),
}

/// String-label to class-index mapping, fixed at fit time.
///
/// Indices are dense, 0-based, and assigned in first-encounter order over the
/// training labels. The map is embedded in the persisted artifact so the
/// serving side decodes the exact training-time vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMap {
    labels: Vec<String>,
}

impl LabelMap {
    /// Scan labels in encounter order and assign each distinct one the next
    /// unused index.
    pub fn fit<'a>(labels: impl IntoIterator<Item = &'a str>) -> Result<Self, LabelError> {
        let mut distinct: Vec<String> = Vec::new();
        for label in labels {
            if !distinct.iter().any(|seen| seen == label) {
                distinct.push(label.to_string());
            }
        }
        if distinct.len() < 2 {
            return Err(LabelError::InsufficientClasses {
                found: distinct.len(),
            });
        }
        Ok(Self { labels: distinct })
    }

    /// Rebuild a map from labels already in index order (artifact load path).
    pub fn from_ordered(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in class-index order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|seen| seen == label)
    }

    /// Encode a label, failing on vocabulary not present at fit time.
    pub fn require_index(&self, label: &str) -> Result<usize, LabelError> {
        self.index_of(label)
            .ok_or_else(|| LabelError::Unknown(label.to_string()))
    }

    /// Inverse lookup: class index back to the original label.
    pub fn label_of(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_indices_in_encounter_order() {
        let map = LabelMap::fit(["b", "a", "b", "c", "a"]).unwrap();
        assert_eq!(map.labels(), ["b", "a", "c"]);
        assert_eq!(map.index_of("a"), Some(1));
        assert_eq!(map.label_of(2), Some("c"));
    }

    #[test]
    fn fewer_than_two_classes_is_an_error() {
        let err = LabelMap::fit(["only", "only"]).unwrap_err();
        assert!(matches!(err, LabelError::InsufficientClasses { found: 1 }));
        let err = LabelMap::fit([]).unwrap_err();
        assert!(matches!(err, LabelError::InsufficientClasses { found: 0 }));
    }

    #[test]
    fn unknown_label_is_rejected() {
        let map = LabelMap::fit(["a", "b"]).unwrap();
        assert!(matches!(
            map.require_index("z"),
            Err(LabelError::Unknown(_))
        ));
    }
}
