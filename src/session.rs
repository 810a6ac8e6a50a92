//! Facade tying the pipeline together for a presentation shell.
//!
//! A shell (CLI, GUI, test harness) drives the whole lifecycle through this
//! type: probe for files, train and evaluate, reload a persisted model, and
//! serve single-sample predictions. Every failure is a typed error for the
//! caller to report; nothing here terminates the process.

use std::time::Instant;

use thiserror::Error;

use crate::config::PipelineConfig;
use crate::dataset::{self, DatasetLoadError, SplitError};
use crate::engine::{PredictError, PredictionEngine};
use crate::ml::features::FeatureSchema;
use crate::ml::labels::{LabelError, LabelMap};
use crate::ml::metrics::{self, EvalError, EvaluationMetrics};
use crate::ml::softmax::{PredictionResult, TrainError, train_softmax};
use crate::model_store::{self, ArtifactError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Dataset(#[from] DatasetLoadError),
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error(transparent)]
    Label(#[from] LabelError),
    #[error(transparent)]
    Train(#[from] TrainError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    Predict(#[from] PredictError),
}

/// What the shell can tell the user on startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub dataset_present: bool,
    pub model_present: bool,
}

/// Outcome of one training run.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub elapsed_seconds: f64,
    pub iterations: usize,
    pub metrics: EvaluationMetrics,
}

/// One pipeline session: configuration plus the active prediction engine.
pub struct Session {
    config: PipelineConfig,
    engine: PredictionEngine,
}

impl Session {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            engine: PredictionEngine::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn engine(&self) -> &PredictionEngine {
        &self.engine
    }

    /// Probe the configured paths without reading them fully.
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            dataset_present: self.config.dataset_path.is_file(),
            model_present: self.config.artifact_path.is_file(),
        }
    }

    /// Run the full lifecycle: load, split, encode, fit, evaluate, persist,
    /// and install the fresh model into the engine.
    pub fn train(&self) -> Result<TrainReport, SessionError> {
        let started = Instant::now();
        tracing::info!(dataset = %self.config.dataset_path.display(), "training started");

        let samples = dataset::load_dataset(&self.config.dataset_path)?;
        let split =
            dataset::split_dataset(&samples, self.config.test_fraction, self.config.seed)?;
        tracing::info!(
            train = split.train.len(),
            test = split.test.len(),
            "dataset split"
        );

        let labels = LabelMap::fit(split.train.iter().map(|s| s.label.as_str()))?;
        let schema = FeatureSchema::iris();
        let x: Vec<Vec<f32>> = split
            .train
            .iter()
            .map(|sample| schema.vector_from_sample(sample))
            .collect();
        let mut y = Vec::with_capacity(split.train.len());
        for sample in &split.train {
            y.push(labels.require_index(&sample.label)?);
        }

        let (model, summary) =
            train_softmax(&x, &y, schema, labels, &self.config.trainer)?;
        let metrics = metrics::evaluate(&model, &split.test)?;
        model_store::save_model(&self.config.artifact_path, &model)?;
        self.engine.install(model);

        let elapsed_seconds = started.elapsed().as_secs_f64();
        tracing::info!(
            elapsed_seconds,
            iterations = summary.iterations,
            macro_accuracy = metrics.macro_accuracy,
            log_loss = metrics.log_loss,
            "training finished"
        );
        Ok(TrainReport {
            elapsed_seconds,
            iterations: summary.iterations,
            metrics,
        })
    }

    /// Reload the persisted artifact into the engine.
    ///
    /// On failure the previously installed model, if any, stays active.
    pub fn load_model(&self) -> Result<(), SessionError> {
        match model_store::load_model(&self.config.artifact_path) {
            Ok(model) => {
                self.engine.install(model);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    path = %self.config.artifact_path.display(),
                    error = %err,
                    "model load failed; keeping the current model"
                );
                Err(err.into())
            }
        }
    }

    /// Predict per-class probabilities for four raw measurement values.
    pub fn predict(&self, raw: &[f32]) -> Result<PredictionResult, SessionError> {
        Ok(self.engine.predict(raw)?)
    }
}
