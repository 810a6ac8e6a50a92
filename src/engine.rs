//! Prediction engine holding the single active model.

use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::ml::features::SchemaError;
use crate::ml::softmax::{PredictionResult, SoftmaxModel};

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("no model has been trained or loaded yet")]
    NotReady,
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Serves predictions from exactly one fitted model at a time.
///
/// The model slot is replaced atomically on install; predictions in flight
/// keep their own `Arc` to the model they started with, so a retrain never
/// exposes a half-swapped state.
#[derive(Debug, Default)]
pub struct PredictionEngine {
    model: RwLock<Option<Arc<SoftmaxModel>>>,
}

impl PredictionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically swap in a freshly trained or reloaded model.
    pub fn install(&self, model: SoftmaxModel) {
        let mut slot = self.model.write().expect("model slot lock poisoned");
        *slot = Some(Arc::new(model));
    }

    /// Snapshot of the currently installed model, if any.
    pub fn current(&self) -> Option<Arc<SoftmaxModel>> {
        self.model
            .read()
            .expect("model slot lock poisoned")
            .clone()
    }

    pub fn is_ready(&self) -> bool {
        self.current().is_some()
    }

    /// Predict per-class probabilities for raw measurement values.
    pub fn predict(&self, raw: &[f32]) -> Result<PredictionResult, PredictError> {
        let model = self.current().ok_or(PredictError::NotReady)?;
        let vector = model.schema.vector_from_raw(raw)?;
        Ok(model.predict(&vector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::features::FeatureSchema;
    use crate::ml::labels::LabelMap;

    fn model(bias: Vec<f32>) -> SoftmaxModel {
        SoftmaxModel {
            schema: FeatureSchema::iris(),
            labels: LabelMap::fit(["a", "b"]).unwrap(),
            weights: vec![0.0; 8],
            bias,
        }
    }

    #[test]
    fn predicting_without_a_model_is_not_ready() {
        let engine = PredictionEngine::new();
        assert!(!engine.is_ready());
        assert!(matches!(
            engine.predict(&[1.0, 2.0, 3.0, 4.0]),
            Err(PredictError::NotReady)
        ));
    }

    #[test]
    fn wrong_value_count_is_a_schema_error() {
        let engine = PredictionEngine::new();
        engine.install(model(vec![0.0, 0.0]));
        assert!(matches!(
            engine.predict(&[1.0, 2.0]),
            Err(PredictError::Schema(SchemaError::Mismatch { expected: 4, actual: 2 }))
        ));
    }

    #[test]
    fn install_replaces_the_active_model() {
        let engine = PredictionEngine::new();
        engine.install(model(vec![5.0, 0.0]));
        assert_eq!(engine.predict(&[0.0; 4]).unwrap().class_index, 0);
        engine.install(model(vec![0.0, 5.0]));
        assert_eq!(engine.predict(&[0.0; 4]).unwrap().class_index, 1);
    }

    #[test]
    fn in_flight_snapshot_survives_a_swap() {
        let engine = PredictionEngine::new();
        engine.install(model(vec![5.0, 0.0]));
        let snapshot = engine.current().unwrap();
        engine.install(model(vec![0.0, 5.0]));
        assert_eq!(snapshot.predict(&[0.0; 4]).class_index, 0);
        assert_eq!(engine.predict(&[0.0; 4]).unwrap().class_index, 1);
    }
}
