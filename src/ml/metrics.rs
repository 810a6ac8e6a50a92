//! Evaluation metrics for the fitted classifier.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::Sample;
use crate::ml::labels::LabelError;
use crate::ml::softmax::SoftmaxModel;

/// Floor applied to the true-class probability before taking logarithms.
const P_CLIP: f32 = 1e-7;

#[derive(Debug, Clone)]
/// Confusion matrix for a `K`-class classifier.
pub struct ConfusionMatrix {
    /// Number of classes.
    pub n_classes: usize,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u32>,
}

impl ConfusionMatrix {
    /// Create an empty `KxK` confusion matrix.
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            counts: vec![0; n_classes * n_classes],
        }
    }

    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth >= self.n_classes || predicted >= self.n_classes {
            return;
        }
        let idx = truth * self.n_classes + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes + predicted]
    }

    /// Total number of true examples for a class.
    pub fn support(&self, truth: usize) -> u32 {
        (0..self.n_classes)
            .map(|predicted| self.get(truth, predicted))
            .sum()
    }

    /// `TP / (TP + FN)` for a class; NaN when the class has no examples.
    pub fn recall(&self, truth: usize) -> f32 {
        let support = self.support(truth);
        if support == 0 {
            return f32::NAN;
        }
        self.get(truth, truth) as f32 / support as f32
    }
}

/// Log-loss entry for one class index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassLogLoss {
    pub label: String,
    /// NaN when the test set has no samples of this class.
    pub log_loss: f32,
    pub support: u32,
}

/// Metrics snapshot over a test subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// Mean per-class recall over classes with test support, in `[0, 1]`.
    pub macro_accuracy: f32,
    /// Mean `-ln(p_true)` over all test samples.
    pub log_loss: f32,
    /// Indexed by class index.
    pub per_class: Vec<ClassLogLoss>,
}

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("empty test set")]
    EmptyTestSet,
    #[error(transparent)]
    Label(#[from] LabelError),
}

/// Evaluate a fitted model over a test subset.
pub fn evaluate(model: &SoftmaxModel, test: &[Sample]) -> Result<EvaluationMetrics, EvalError> {
    if test.is_empty() {
        return Err(EvalError::EmptyTestSet);
    }
    let classes = model.n_classes();
    let mut cm = ConfusionMatrix::new(classes);
    let mut loss_sum = 0.0f32;
    let mut class_loss_sum = vec![0.0f32; classes];

    for sample in test {
        let truth = model.labels.require_index(&sample.label)?;
        let vector = model.schema.vector_from_sample(sample);
        let probs = model.predict_proba(&vector);
        let predicted = crate::ml::softmax::argmax(&probs);
        cm.add(truth, predicted);
        let nll = -probs[truth].max(P_CLIP).ln();
        loss_sum += nll;
        class_loss_sum[truth] += nll;
    }

    // Average recall only over classes the test set actually contains; a
    // recall over zero samples is undefined, like the per-class log loss.
    let mut recall_sum = 0.0f32;
    let mut represented = 0usize;
    for class_idx in 0..classes {
        let recall = cm.recall(class_idx);
        if !recall.is_nan() {
            recall_sum += recall;
            represented += 1;
        }
    }
    let macro_accuracy = if represented == 0 {
        0.0
    } else {
        recall_sum / represented as f32
    };

    let per_class = (0..classes)
        .map(|class_idx| {
            let support = cm.support(class_idx);
            let log_loss = if support == 0 {
                f32::NAN
            } else {
                class_loss_sum[class_idx] / support as f32
            };
            ClassLogLoss {
                label: model
                    .labels
                    .label_of(class_idx)
                    .unwrap_or_default()
                    .to_string(),
                log_loss,
                support,
            }
        })
        .collect();

    Ok(EvaluationMetrics {
        macro_accuracy,
        log_loss: loss_sum / test.len() as f32,
        per_class,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::features::FeatureSchema;
    use crate::ml::labels::LabelMap;

    fn sample(petal_length: f32, label: &str) -> Sample {
        Sample {
            sepal_length: 0.0,
            sepal_width: 0.0,
            petal_length,
            petal_width: 0.0,
            label: label.to_string(),
        }
    }

    /// Model that predicts class 1 once petal length crosses zero.
    fn threshold_model() -> SoftmaxModel {
        SoftmaxModel {
            schema: FeatureSchema::iris(),
            labels: LabelMap::fit(["short", "long", "other"]).unwrap(),
            weights: vec![
                0.0, 0.0, -4.0, 0.0, //
                0.0, 0.0, 4.0, 0.0, //
                0.0, 0.0, 0.0, 0.0,
            ],
            bias: vec![0.0, 0.0, -10.0],
        }
    }

    #[test]
    fn perfect_predictions_score_full_macro_accuracy() {
        let model = threshold_model();
        let test = vec![
            sample(-2.0, "short"),
            sample(-1.5, "short"),
            sample(2.0, "long"),
        ];
        let metrics = evaluate(&model, &test).unwrap();
        assert!((metrics.macro_accuracy - 1.0).abs() < 1e-6);
        assert!(metrics.log_loss >= 0.0);
    }

    #[test]
    fn macro_accuracy_averages_per_class_recall() {
        let model = threshold_model();
        // Class "short": 2 of 2 correct. Class "long": 1 of 3 correct.
        let test = vec![
            sample(-2.0, "short"),
            sample(-2.0, "short"),
            sample(3.0, "long"),
            sample(-3.0, "long"),
            sample(-3.0, "long"),
        ];
        let metrics = evaluate(&model, &test).unwrap();
        // Micro accuracy would be 3/5; macro is (1 + 1/3) / 2.
        assert!((metrics.macro_accuracy - (1.0 + 1.0 / 3.0) / 2.0).abs() < 1e-5);
    }

    #[test]
    fn absent_class_reports_nan_log_loss() {
        let model = threshold_model();
        let test = vec![sample(-2.0, "short"), sample(2.0, "long")];
        let metrics = evaluate(&model, &test).unwrap();
        assert_eq!(metrics.per_class.len(), 3);
        assert!(metrics.per_class[2].log_loss.is_nan());
        assert_eq!(metrics.per_class[2].support, 0);
        assert!(metrics.per_class[0].log_loss >= 0.0);
    }

    #[test]
    fn unknown_test_label_is_an_error() {
        let model = threshold_model();
        let test = vec![sample(1.0, "mystery")];
        assert!(matches!(
            evaluate(&model, &test),
            Err(EvalError::Label(LabelError::Unknown(_)))
        ));
    }

    #[test]
    fn empty_test_set_is_an_error() {
        let model = threshold_model();
        assert!(matches!(evaluate(&model, &[]), Err(EvalError::EmptyTestSet)));
    }
}
