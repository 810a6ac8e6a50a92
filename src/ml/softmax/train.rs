//! Full-batch gradient-descent trainer for the softmax classifier.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{SoftmaxModel, softmax};
use crate::ml::features::FeatureSchema;
use crate::ml::labels::LabelMap;

/// Floor applied to probabilities before taking logarithms.
const P_CLIP: f32 = 1e-7;

/// Training options for the softmax classifier.
///
/// Fitting is full-batch descent in dataset order, so results are fully
/// deterministic for a fixed dataset and options; no RNG is involved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainOptions {
    /// Iteration cap.
    pub max_iters: usize,
    /// Stop once the loss improvement drops below this threshold.
    pub tol: f32,
    pub learning_rate: f32,
    /// L2 regularization strength.
    pub l2: f32,
}

impl Default for TrainOptions {
    fn default() -> Self {
        // Step size sized for raw centimeter-scale measurements; larger rates
        // oscillate instead of descending.
        Self {
            max_iters: 5000,
            tol: 1e-7,
            learning_rate: 0.02,
            l2: 1e-4,
        }
    }
}

/// Observable outcome of a fit, reported alongside the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSummary {
    /// Iterations actually run (monotonic progress counter).
    pub iterations: usize,
    /// Regularized loss after the final iteration.
    pub final_loss: f32,
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("empty training set")]
    EmptyTrainingSet,
    #[error("mismatched training inputs ({inputs}) and labels ({labels})")]
    MismatchedInputs { inputs: usize, labels: usize },
    #[error("feature row {row} has {found} value(s), expected {expected}")]
    BadRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("class index {index} out of range for {classes} class(es)")]
    BadClassIndex { index: usize, classes: usize },
}

/// Fit a softmax classifier on encoded features and labels.
///
/// Weights start at zero. Each iteration accumulates the softmax gradient
/// over the whole training set in dataset order, then applies
/// `w -= lr * (grad / n + l2 * w)`. Stops when the L2-regularized log loss
/// improves by less than `tol` or at `max_iters`.
pub fn train_softmax(
    x: &[Vec<f32>],
    y: &[usize],
    schema: FeatureSchema,
    labels: LabelMap,
    options: &TrainOptions,
) -> Result<(SoftmaxModel, FitSummary), TrainError> {
    if x.is_empty() {
        return Err(TrainError::EmptyTrainingSet);
    }
    if x.len() != y.len() {
        return Err(TrainError::MismatchedInputs {
            inputs: x.len(),
            labels: y.len(),
        });
    }
    let classes = labels.len();
    let dim = schema.feature_count();
    for (row_idx, row) in x.iter().enumerate() {
        if row.len() != dim {
            return Err(TrainError::BadRow {
                row: row_idx,
                found: row.len(),
                expected: dim,
            });
        }
    }
    for &truth in y {
        if truth >= classes {
            return Err(TrainError::BadClassIndex {
                index: truth,
                classes,
            });
        }
    }

    let n = x.len() as f32;
    let lr = options.learning_rate;
    let l2 = options.l2.max(0.0);
    let mut weights = vec![0.0f32; classes * dim];
    let mut bias = vec![0.0f32; classes];

    let mut prev_loss = f32::INFINITY;
    let mut loss = f32::INFINITY;
    let mut iterations = 0usize;

    for iter in 0..options.max_iters {
        let mut grad_w = vec![0.0f32; weights.len()];
        let mut grad_b = vec![0.0f32; bias.len()];
        let mut data_loss = 0.0f32;

        for (row, &truth) in x.iter().zip(y) {
            let mut logits = vec![0.0f32; classes];
            for (class_idx, logit) in logits.iter_mut().enumerate() {
                let base = class_idx * dim;
                let mut sum = bias[class_idx];
                for i in 0..dim {
                    sum += weights[base + i] * row[i];
                }
                *logit = sum;
            }
            let probs = softmax(&logits);
            data_loss -= probs[truth].max(P_CLIP).ln();
            for class_idx in 0..classes {
                let diff = probs[class_idx] - if class_idx == truth { 1.0 } else { 0.0 };
                let base = class_idx * dim;
                for i in 0..dim {
                    grad_w[base + i] += diff * row[i];
                }
                grad_b[class_idx] += diff;
            }
        }

        let inv = 1.0 / n;
        let mut reg = 0.0f32;
        for class_idx in 0..classes {
            let base = class_idx * dim;
            for i in 0..dim {
                let idx = base + i;
                let w = weights[idx];
                reg += w * w;
                weights[idx] -= lr * (grad_w[idx] * inv + l2 * w);
            }
            bias[class_idx] -= lr * grad_b[class_idx] * inv;
        }

        loss = data_loss * inv + 0.5 * l2 * reg;
        iterations = iter + 1;
        if prev_loss - loss < options.tol {
            break;
        }
        prev_loss = loss;
    }

    tracing::debug!(iterations, final_loss = loss, "softmax fit stopped");

    let model = SoftmaxModel {
        schema,
        labels,
        weights,
        bias,
    };
    Ok((
        model,
        FitSummary {
            iterations,
            final_loss: loss,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_problem() -> (Vec<Vec<f32>>, Vec<usize>, FeatureSchema, LabelMap) {
        // Three tight clusters keyed mainly on petal measurements.
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..10 {
            let jitter = i as f32 * 0.02;
            x.push(vec![5.0 + jitter, 3.4, 1.4 + jitter, 0.2]);
            y.push(0);
            x.push(vec![5.9 + jitter, 2.8, 4.3 + jitter, 1.3]);
            y.push(1);
            x.push(vec![6.5 + jitter, 3.0, 5.8 + jitter, 2.2]);
            y.push(2);
        }
        let labels = LabelMap::fit(["setosa", "versicolor", "virginica"]).unwrap();
        (x, y, FeatureSchema::iris(), labels)
    }

    #[test]
    fn fits_separable_clusters() {
        let (x, y, schema, labels) = separable_problem();
        let options = TrainOptions::default();
        let (model, summary) = train_softmax(&x, &y, schema, labels, &options).unwrap();
        assert!(summary.iterations > 0);
        assert!(summary.final_loss.is_finite());
        model.validate().unwrap();
        for (row, &truth) in x.iter().zip(&y) {
            assert_eq!(model.predict(row).class_index, truth);
        }
    }

    #[test]
    fn fit_is_deterministic() {
        let (x, y, schema, labels) = separable_problem();
        let options = TrainOptions::default();
        let (first, _) =
            train_softmax(&x, &y, schema.clone(), labels.clone(), &options).unwrap();
        let (second, _) = train_softmax(&x, &y, schema, labels, &options).unwrap();
        assert_eq!(first.weights, second.weights);
        assert_eq!(first.bias, second.bias);
    }

    #[test]
    fn iteration_cap_is_honored() {
        let (x, y, schema, labels) = separable_problem();
        let options = TrainOptions {
            max_iters: 3,
            tol: 0.0,
            ..TrainOptions::default()
        };
        let (_, summary) = train_softmax(&x, &y, schema, labels, &options).unwrap();
        assert_eq!(summary.iterations, 3);
    }

    #[test]
    fn rejects_empty_and_mismatched_input() {
        let labels = LabelMap::fit(["a", "b"]).unwrap();
        let schema = FeatureSchema::iris();
        assert!(matches!(
            train_softmax(&[], &[], schema.clone(), labels.clone(), &TrainOptions::default()),
            Err(TrainError::EmptyTrainingSet)
        ));
        let x = vec![vec![0.0; 4]];
        assert!(matches!(
            train_softmax(&x, &[0, 1], schema.clone(), labels.clone(), &TrainOptions::default()),
            Err(TrainError::MismatchedInputs { .. })
        ));
        assert!(matches!(
            train_softmax(&x, &[5], schema, labels, &TrainOptions::default()),
            Err(TrainError::BadClassIndex { index: 5, .. })
        ));
    }

    #[test]
    fn rejects_rows_off_schema() {
        let labels = LabelMap::fit(["a", "b"]).unwrap();
        let schema = FeatureSchema::iris();
        let x = vec![vec![0.0; 4], vec![0.0; 3]];
        assert!(matches!(
            train_softmax(&x, &[0, 1], schema, labels, &TrainOptions::default()),
            Err(TrainError::BadRow { row: 1, found: 3, expected: 4 })
        ));
    }
}
