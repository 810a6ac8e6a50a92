//! Loader for the raw delimited measurement file.
//!
//! The expected format is the classic UCI iris layout: no header, one sample
//! per line, `f32,f32,f32,f32,label` with a comma separator. Blank lines are
//! tolerated; anything else malformed rejects the whole file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::Sample;

/// Fields per data row: four measurements plus the label.
pub const FIELDS_PER_ROW: usize = 5;

#[derive(Debug, Error)]
pub enum DatasetLoadError {
    /// The dataset file does not exist at the configured path.
    #[error("dataset not found at {path}")]
    NotFound { path: PathBuf },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A row failed to parse; `line` is 1-based.
    #[error("malformed dataset row at line {line}: {reason}")]
    Format { line: usize, reason: String },
}

/// Load every sample from a delimited text file, in file order.
///
/// Returns either the complete dataset or the first error encountered; a
/// malformed row never yields a partial dataset.
pub fn load_dataset(path: &Path) -> Result<Vec<Sample>, DatasetLoadError> {
    if !path.is_file() {
        return Err(DatasetLoadError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let reader = BufReader::new(File::open(path)?);
    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let sample = parse_row(trimmed).map_err(|reason| DatasetLoadError::Format {
            line: idx + 1,
            reason,
        })?;
        out.push(sample);
    }
    tracing::info!(
        path = %path.display(),
        samples = out.len(),
        "dataset loaded"
    );
    Ok(out)
}

fn parse_row(row: &str) -> Result<Sample, String> {
    let fields: Vec<&str> = row.split(',').collect();
    if fields.len() != FIELDS_PER_ROW {
        return Err(format!(
            "expected {FIELDS_PER_ROW} fields, found {}",
            fields.len()
        ));
    }
    let mut values = [0.0f32; 4];
    for (slot, field) in values.iter_mut().zip(&fields[..4]) {
        let text = field.trim();
        *slot = text
            .parse::<f32>()
            .map_err(|_| format!("not a number: {text:?}"))?;
    }
    let label = fields[4].trim();
    if label.is_empty() {
        return Err("empty label".to_string());
    }
    Ok(Sample {
        sepal_length: values[0],
        sepal_width: values[1],
        petal_length: values[2],
        petal_width: values[3],
        label: label.to_string(),
    })
}
