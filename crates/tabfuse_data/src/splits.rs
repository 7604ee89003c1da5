//! Train/validation splitting.

use ndarray::{Array2, Axis};
use rand::seq::SliceRandom;

use crate::error::{DataError, Result};
use tabfuse_core::Seed;

/// The two halves of a shuffled split.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit<T> {
    /// Training features.
    pub x_train: Array2<f64>,
    /// Held-out features.
    pub x_test: Array2<f64>,
    /// Training labels.
    pub y_train: Vec<T>,
    /// Held-out labels.
    pub y_test: Vec<T>,
}

/// Shuffle and split rows into train and test subsets.
///
/// The test subset receives `ceil(n * test_ratio)` rows and the training
/// subset the remainder. The split is not stratified.
///
/// # Arguments
///
/// * `x` - Feature matrix (samples × features)
/// * `y` - Labels, one per row of `x`
/// * `test_ratio` - Fraction of rows held out, in `(0, 1)`
/// * `seed` - Random seed for the shuffle
///
/// # Errors
///
/// Returns [`DataError::SplitError`] if the ratio is outside `(0, 1)` or
/// either side would be empty, and [`DataError::InvalidShape`] if `x` and
/// `y` have different lengths.
pub fn train_test_split<T: Clone>(
    x: &Array2<f64>,
    y: &[T],
    test_ratio: f64,
    seed: Seed,
) -> Result<TrainTestSplit<T>> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(DataError::SplitError(format!(
            "test_ratio must be between 0 and 1, got {test_ratio}"
        )));
    }
    if x.nrows() != y.len() {
        return Err(DataError::InvalidShape(format!(
            "x has {} samples but y has {} labels",
            x.nrows(),
            y.len()
        )));
    }

    let n = y.len();
    let n_test = (n as f64 * test_ratio).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(DataError::SplitError(format!(
            "cannot hold out {n_test} of {n} samples with test_ratio {test_ratio}"
        )));
    }

    let mut rng = seed.to_rng();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);
    let take = |idx: &[usize]| idx.iter().map(|&i| y[i].clone()).collect::<Vec<_>>();

    Ok(TrainTestSplit {
        x_train: x.select(Axis(0), train_idx),
        x_test: x.select(Axis(0), test_idx),
        y_train: take(train_idx),
        y_test: take(test_idx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> (Array2<f64>, Vec<usize>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| (i * 2 + j) as f64);
        let y = (0..n).collect();
        (x, y)
    }

    #[test]
    fn test_sizes_use_ceiling() {
        let (x, y) = rows(11);
        let split = train_test_split(&x, &y, 0.2, Seed::new(42)).unwrap();
        // ceil(11 * 0.2) = 3
        assert_eq!(split.y_test.len(), 3);
        assert_eq!(split.y_train.len(), 8);
        assert_eq!(split.x_test.nrows(), 3);
        assert_eq!(split.x_train.nrows(), 8);
    }

    #[test]
    fn test_partition_is_complete_and_rows_follow_labels() {
        let (x, y) = rows(20);
        let split = train_test_split(&x, &y, 0.25, Seed::new(7)).unwrap();

        let mut all: Vec<usize> = split.y_train.iter().chain(&split.y_test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, y);

        for (row, &label) in split.y_train.iter().enumerate() {
            assert_eq!(split.x_train[[row, 0]], (label * 2) as f64);
        }
    }

    #[test]
    fn test_reproducible() {
        let (x, y) = rows(30);
        let a = train_test_split(&x, &y, 0.2, Seed::new(1)).unwrap();
        let b = train_test_split(&x, &y, 0.2, Seed::new(1)).unwrap();
        let c = train_test_split(&x, &y, 0.2, Seed::new(2)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.y_test, c.y_test);
    }

    #[test]
    fn test_invalid_ratio_and_tiny_input() {
        let (x, y) = rows(10);
        assert!(train_test_split(&x, &y, 0.0, Seed::new(0)).is_err());
        assert!(train_test_split(&x, &y, 1.0, Seed::new(0)).is_err());

        let (x, y) = rows(1);
        assert!(matches!(
            train_test_split(&x, &y, 0.5, Seed::new(0)),
            Err(DataError::SplitError(_))
        ));
    }
}
