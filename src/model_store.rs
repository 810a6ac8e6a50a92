//! Versioned JSON persistence for fitted models.
//!
//! The artifact carries everything inference needs: the ordered feature
//! names, the labels in class-index order, and one bias-first weight row per
//! class. Loading never re-runs any training step.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ml::features::FeatureSchema;
use crate::ml::labels::LabelMap;
use crate::ml::softmax::SoftmaxModel;

/// Artifact format understood by this reader.
pub const ARTIFACT_FORMAT_VERSION: i64 = 1;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to access model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("model artifact is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported artifact format version {found} (expected {ARTIFACT_FORMAT_VERSION})")]
    UnsupportedVersion { found: i64 },
    #[error("corrupt model artifact: {0}")]
    Invalid(String),
}

/// On-disk shape of a persisted model.
#[derive(Debug, Serialize, Deserialize)]
struct ModelArtifact {
    format_version: i64,
    /// Ordered feature names.
    feature_names: Vec<String>,
    /// Labels in class-index order.
    labels: Vec<String>,
    /// Class-major rows, bias first, then one coefficient per feature.
    weight_rows: Vec<Vec<f32>>,
}

/// Persist a fitted model as a versioned JSON artifact.
pub fn save_model(path: &Path, model: &SoftmaxModel) -> Result<(), ArtifactError> {
    let dim = model.n_features();
    let weight_rows = (0..model.n_classes())
        .map(|class_idx| {
            let base = class_idx * dim;
            let mut row = Vec::with_capacity(dim + 1);
            row.push(model.bias[class_idx]);
            row.extend_from_slice(&model.weights[base..base + dim]);
            row
        })
        .collect();
    let artifact = ModelArtifact {
        format_version: ARTIFACT_FORMAT_VERSION,
        feature_names: model.schema.names().to_vec(),
        labels: model.labels.labels().to_vec(),
        weight_rows,
    };
    let bytes = serde_json::to_vec_pretty(&artifact)?;
    std::fs::write(path, bytes).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "model artifact saved");
    Ok(())
}

/// Reload a fitted model from a versioned JSON artifact.
///
/// Fails fast on version mismatch or structural damage instead of producing
/// silently wrong predictions.
pub fn load_model(path: &Path) -> Result<SoftmaxModel, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let artifact: ModelArtifact = serde_json::from_slice(&bytes)?;
    if artifact.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(ArtifactError::UnsupportedVersion {
            found: artifact.format_version,
        });
    }

    let dim = artifact.feature_names.len();
    if artifact.weight_rows.len() != artifact.labels.len() {
        return Err(ArtifactError::Invalid(format!(
            "{} weight row(s) for {} label(s)",
            artifact.weight_rows.len(),
            artifact.labels.len()
        )));
    }
    let mut weights = Vec::with_capacity(artifact.labels.len() * dim);
    let mut bias = Vec::with_capacity(artifact.labels.len());
    for (class_idx, row) in artifact.weight_rows.iter().enumerate() {
        if row.len() != dim + 1 {
            return Err(ArtifactError::Invalid(format!(
                "weight row {class_idx} has {} value(s), expected {}",
                row.len(),
                dim + 1
            )));
        }
        bias.push(row[0]);
        weights.extend_from_slice(&row[1..]);
    }

    let model = SoftmaxModel {
        schema: FeatureSchema::from_ordered(artifact.feature_names),
        labels: LabelMap::from_ordered(artifact.labels),
        weights,
        bias,
    };
    model.validate().map_err(ArtifactError::Invalid)?;
    tracing::info!(path = %path.display(), classes = model.n_classes(), "model artifact loaded");
    Ok(model)
}
