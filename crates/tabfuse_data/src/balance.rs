//! Random oversampling of minority classes.

use std::collections::BTreeMap;

use ndarray::{Array2, Axis};
use rand::Rng;
use tracing::debug;

use crate::error::{DataError, Result};
use tabfuse_core::Seed;

/// Oversamples every minority class up to the majority-class count.
///
/// Original rows are kept in order; resampled rows (drawn with replacement
/// from each minority class) are appended after them, class by class in
/// sorted label order.
///
/// # Example
///
/// ```rust
/// use ndarray::Array2;
/// use tabfuse_core::Seed;
/// use tabfuse_data::RandomOverSampler;
///
/// let x = Array2::<f64>::zeros((4, 2));
/// let y = vec![0usize, 0, 0, 1];
/// let (xr, yr) = RandomOverSampler::new(Seed::new(1)).fit_resample(&x, &y).unwrap();
/// assert_eq!(xr.nrows(), 6);
/// assert_eq!(yr.iter().filter(|&&c| c == 1).count(), 3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RandomOverSampler {
    seed: Seed,
}

impl RandomOverSampler {
    /// Create an oversampler drawing from `seed`.
    #[must_use]
    pub fn new(seed: Seed) -> Self {
        Self { seed }
    }

    /// Balance `x` and `y` so every class has the majority count.
    ///
    /// # Errors
    ///
    /// - [`DataError::EmptyData`] if there are no samples
    /// - [`DataError::InvalidShape`] if `x` and `y` disagree on the sample count
    /// - [`DataError::SingleClass`] if `y` holds fewer than two classes
    pub fn fit_resample<T>(&self, x: &Array2<f64>, y: &[T]) -> Result<(Array2<f64>, Vec<T>)>
    where
        T: Clone + Ord,
    {
        if y.is_empty() {
            return Err(DataError::EmptyData);
        }
        if x.nrows() != y.len() {
            return Err(DataError::InvalidShape(format!(
                "x has {} samples but y has {} labels",
                x.nrows(),
                y.len()
            )));
        }

        let mut by_class: BTreeMap<&T, Vec<usize>> = BTreeMap::new();
        for (i, label) in y.iter().enumerate() {
            by_class.entry(label).or_default().push(i);
        }
        if by_class.len() < 2 {
            return Err(DataError::SingleClass {
                n_classes: by_class.len(),
            });
        }

        let majority = by_class.values().map(Vec::len).max().unwrap_or(0);
        let mut rng = self.seed.to_rng();
        let mut indices: Vec<usize> = (0..y.len()).collect();
        for members in by_class.values() {
            let missing = majority - members.len();
            indices.extend((0..missing).map(|_| members[rng.gen_range(0..members.len())]));
        }

        debug!(
            before = y.len(),
            after = indices.len(),
            n_classes = by_class.len(),
            "Oversampled minority classes"
        );

        let x_out = x.select(Axis(0), &indices);
        let y_out = indices.iter().map(|&i| y[i].clone()).collect();
        Ok((x_out, y_out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn count(y: &[&str], class: &str) -> usize {
        y.iter().filter(|&&c| c == class).count()
    }

    #[test]
    fn test_balances_to_majority() {
        let x = Array2::from_shape_fn((100, 10), |(i, j)| (i * 10 + j) as f64);
        let y: Vec<&str> = (0..100).map(|i| if i < 90 { "a" } else { "b" }).collect();

        let (xr, yr) = RandomOverSampler::new(Seed::new(42)).fit_resample(&x, &y).unwrap();
        assert_eq!(xr.nrows(), 180);
        assert_eq!(count(&yr, "a"), 90);
        assert_eq!(count(&yr, "b"), 90);
    }

    #[test]
    fn test_originals_kept_and_resampled_rows_match_class() {
        let x = Array2::from_shape_fn((5, 1), |(i, _)| i as f64);
        let y = vec![0usize, 0, 0, 1, 1];

        let (xr, yr) = RandomOverSampler::new(Seed::new(3)).fit_resample(&x, &y).unwrap();
        assert_eq!(xr.slice(ndarray::s![..5, ..]), x);
        assert_eq!(yr.len(), 6);
        assert_eq!(yr[5], 1);
        // the appended row must come from class 1 (rows 3 or 4)
        assert!(xr[[5, 0]] == 3.0 || xr[[5, 0]] == 4.0);
    }

    #[test]
    fn test_already_balanced_is_unchanged() {
        let x = Array2::<f64>::zeros((4, 2));
        let y = vec![1, 0, 1, 0];
        let (xr, yr) = RandomOverSampler::new(Seed::new(0)).fit_resample(&x, &y).unwrap();
        assert_eq!(xr.nrows(), 4);
        assert_eq!(yr, y);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let x = Array2::from_shape_fn((10, 1), |(i, _)| i as f64);
        let y: Vec<usize> = (0..10).map(|i| usize::from(i >= 7)).collect();
        let a = RandomOverSampler::new(Seed::new(9)).fit_resample(&x, &y).unwrap();
        let b = RandomOverSampler::new(Seed::new(9)).fit_resample(&x, &y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_class_rejected() {
        let x = Array2::<f64>::zeros((3, 2));
        let err = RandomOverSampler::new(Seed::new(0))
            .fit_resample(&x, &["a", "a", "a"])
            .unwrap_err();
        assert!(matches!(err, DataError::SingleClass { n_classes: 1 }));
    }

    #[test]
    fn test_length_mismatch_and_empty() {
        let x = Array2::<f64>::zeros((3, 2));
        assert!(matches!(
            RandomOverSampler::new(Seed::new(0)).fit_resample(&x, &[0, 1]),
            Err(DataError::InvalidShape(_))
        ));
        let empty: [u8; 0] = [];
        assert!(matches!(
            RandomOverSampler::new(Seed::new(0)).fit_resample(&Array2::zeros((0, 2)), &empty),
            Err(DataError::EmptyData)
        ));
    }
}
