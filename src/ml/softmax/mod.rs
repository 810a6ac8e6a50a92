//! Linear multinomial (softmax) classifier.

use serde::{Deserialize, Serialize};

use crate::ml::features::FeatureSchema;
use crate::ml::labels::LabelMap;

mod train;
pub use train::{FitSummary, TrainError, TrainOptions, train_softmax};

/// Probability distribution over classes for one input vector.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// One entry per class index, summing to 1 within floating-point tolerance.
    pub probabilities: Vec<f32>,
    /// Arg-max class index.
    pub class_index: usize,
    /// Decoded label for the arg-max class.
    pub label: String,
}

/// Fitted linear classifier: weights, label map, and feature schema.
///
/// Immutable after construction; retraining produces a new model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftmaxModel {
    pub schema: FeatureSchema,
    pub labels: LabelMap,
    /// Class-major flat coefficients, `classes * feature_count` values.
    pub weights: Vec<f32>,
    /// One bias per class.
    pub bias: Vec<f32>,
}

impl SoftmaxModel {
    pub fn n_classes(&self) -> usize {
        self.labels.len()
    }

    pub fn n_features(&self) -> usize {
        self.schema.feature_count()
    }

    /// Validate structural invariants of the model.
    pub fn validate(&self) -> Result<(), String> {
        if self.labels.len() < 2 {
            return Err("model must contain at least 2 classes".to_string());
        }
        if self.schema.feature_count() == 0 {
            return Err("feature schema is empty".to_string());
        }
        if !self.schema.matches_sample_fields() {
            return Err("feature schema does not match the sample fields".to_string());
        }
        if self.weights.len() != self.labels.len() * self.schema.feature_count() {
            return Err("weights length mismatch".to_string());
        }
        if self.bias.len() != self.labels.len() {
            return Err("bias length mismatch".to_string());
        }
        Ok(())
    }

    fn logits(&self, features: &[f32]) -> Vec<f32> {
        let dim = self.n_features();
        let mut logits = vec![0.0f32; self.n_classes()];
        for (class_idx, logit) in logits.iter_mut().enumerate() {
            let base = class_idx * dim;
            let mut sum = self.bias[class_idx];
            for (i, &value) in features.iter().enumerate().take(dim) {
                sum += self.weights[base + i] * value;
            }
            *logit = sum;
        }
        logits
    }

    /// Compute class probabilities for a schema-aligned feature vector.
    pub fn predict_proba(&self, features: &[f32]) -> Vec<f32> {
        softmax(&self.logits(features))
    }

    /// Full prediction: probabilities, arg-max index, decoded label.
    pub fn predict(&self, features: &[f32]) -> PredictionResult {
        let probabilities = self.predict_proba(features);
        let class_index = argmax(&probabilities);
        let label = self
            .labels
            .label_of(class_index)
            .unwrap_or_default()
            .to_string();
        PredictionResult {
            probabilities,
            class_index,
            label,
        }
    }
}

/// Numerically stable softmax: subtract the max score before exponentiating.
pub fn softmax(raw: &[f32]) -> Vec<f32> {
    if raw.is_empty() {
        return Vec::new();
    }
    let max = raw.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut exps = Vec::with_capacity(raw.len());
    let mut sum = 0.0f32;
    for &value in raw {
        let e = (value - max).exp();
        exps.push(e);
        sum += e;
    }
    if sum == 0.0 {
        return vec![1.0 / raw.len() as f32; raw.len()];
    }
    for value in &mut exps {
        *value /= sum;
    }
    exps
}

/// Index of the largest value; 0 for an empty slice.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0usize;
    let mut best_value = f32::NEG_INFINITY;
    for (idx, &value) in values.iter().enumerate() {
        if value > best_value {
            best_value = value;
            best = idx;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_model() -> SoftmaxModel {
        SoftmaxModel {
            schema: FeatureSchema::iris(),
            labels: LabelMap::fit(["a", "b", "c"]).unwrap(),
            weights: vec![
                1.0, 0.0, 0.0, 0.0, // class a keys on the first measurement
                0.0, 1.0, 0.0, 0.0, // class b on the second
                0.0, 0.0, 1.0, 0.0, // class c on the third
            ],
            bias: vec![0.0, 0.0, 0.0],
        }
    }

    #[test]
    fn probabilities_form_a_distribution() {
        let model = toy_model();
        let probs = model.predict_proba(&[0.3, 0.2, 0.1, 9.0]);
        assert_eq!(probs.len(), 3);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn argmax_picks_the_dominant_class() {
        let model = toy_model();
        let result = model.predict(&[0.0, 5.0, 0.0, 0.0]);
        assert_eq!(result.class_index, 1);
        assert_eq!(result.label, "b");
    }

    #[test]
    fn softmax_handles_large_scores_without_overflow() {
        let probs = softmax(&[1000.0, 999.0, 0.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn validate_rejects_mismatched_weight_lengths() {
        let mut model = toy_model();
        model.weights.pop();
        assert!(model.validate().is_err());
    }
}
