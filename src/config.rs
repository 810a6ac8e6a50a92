//! Pipeline configuration loaded from an optional TOML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ml::softmax::TrainOptions;

/// Default config file name looked up next to the working directory.
pub const CONFIG_FILE_NAME: &str = "floralearn.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Everything the pipeline needs to run: paths, split policy, trainer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub dataset_path: PathBuf,
    pub artifact_path: PathBuf,
    /// Fraction of samples held out for evaluation, in (0, 1).
    pub test_fraction: f32,
    /// Seed for the deterministic split permutation.
    pub seed: u64,
    pub trainer: TrainOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/iris.data"),
            artifact_path: PathBuf::from("model.json"),
            test_fraction: 0.25,
            seed: 1234,
            trainer: TrainOptions::default(),
        }
    }
}

/// Load configuration from disk, returning defaults if the file is missing.
pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(PipelineConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&text)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn partial_file_fills_missing_fields_from_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "dataset_path = \"custom/iris.data\"\nseed = 9\n\n[trainer]\nmax_iters = 50\n",
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.dataset_path, PathBuf::from("custom/iris.data"));
        assert_eq!(config.seed, 9);
        assert_eq!(config.trainer.max_iters, 50);
        assert_eq!(config.test_fraction, PipelineConfig::default().test_fraction);
        assert_eq!(config.trainer.tol, TrainOptions::default().tol);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "test_fraction = \"lots\"\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }
}
