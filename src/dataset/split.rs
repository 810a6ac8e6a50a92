//! Deterministic train/test partitioning.

use rand::rngs::StdRng;
use rand::{SeedableRng, seq::SliceRandom};
use thiserror::Error;

use super::Sample;

/// Disjoint train/test subsets of a dataset.
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Vec<Sample>,
    pub test: Vec<Sample>,
}

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("test fraction must be in (0, 1), got {0}")]
    InvalidFraction(f32),
}

/// Partition `samples` into train/test subsets.
///
/// Shuffles the index vector with a `StdRng` keyed only by `seed`, takes the
/// first `round(test_fraction * N)` shuffled indices as the test set, and
/// keeps source order inside each subset. The same seed and dataset always
/// reproduce bit-identical membership.
pub fn split_dataset(
    samples: &[Sample],
    test_fraction: f32,
    seed: u64,
) -> Result<Split, SplitError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(SplitError::InvalidFraction(test_fraction));
    }
    let mut indices: Vec<usize> = (0..samples.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_len = (test_fraction * samples.len() as f32).round() as usize;
    let mut test_indices = indices[..test_len].to_vec();
    let mut train_indices = indices[test_len..].to_vec();
    test_indices.sort_unstable();
    train_indices.sort_unstable();

    let pick = |picked: &[usize]| -> Vec<Sample> {
        picked.iter().map(|&idx| samples[idx].clone()).collect()
    };
    Ok(Split {
        train: pick(&train_indices),
        test: pick(&test_indices),
    })
}
