//! Principal component analysis.

use faer::{Mat, Side};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TransformError};

/// Unfitted PCA configuration.
///
/// The fit centres the columns, forms the sample covariance and keeps the
/// eigenvectors of its `n_components` largest eigenvalues.
///
/// # Example
///
/// ```rust
/// use ndarray::array;
/// use tabfuse_transforms::Pca;
///
/// let x = array![[1.0, 2.0], [2.0, 4.1], [3.0, 5.9], [4.0, 8.0]];
/// let pca = Pca::new(1).fit(&x).unwrap();
/// assert_eq!(pca.transform(&x).unwrap().dim(), (4, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pca {
    n_components: usize,
}

impl Pca {
    /// Create a PCA keeping `n_components` components.
    #[must_use]
    pub fn new(n_components: usize) -> Self {
        Self { n_components }
    }

    /// Number of components to keep.
    #[must_use]
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Fit the principal axes of `x`.
    ///
    /// # Errors
    ///
    /// - [`TransformError::EmptyData`] for an empty matrix
    /// - [`TransformError::InvalidParameter`] for zero components
    /// - [`TransformError::TooManyComponents`] if more components are
    ///   requested than `min(samples, features)`
    pub fn fit(&self, x: &Array2<f64>) -> Result<FittedPca> {
        let (n, p) = x.dim();
        if n == 0 || p == 0 {
            return Err(TransformError::EmptyData);
        }
        if self.n_components == 0 {
            return Err(TransformError::InvalidParameter(
                "n_components must be at least 1".to_string(),
            ));
        }
        let max = n.min(p);
        if self.n_components > max {
            return Err(TransformError::TooManyComponents {
                requested: self.n_components,
                max,
            });
        }

        let mean = x.mean_axis(Axis(0)).ok_or(TransformError::EmptyData)?;
        let centred = x - &mean;
        let denom = (n.saturating_sub(1)).max(1) as f64;
        let cov = centred.t().dot(&centred) / denom;

        let cov_mat = Mat::<f64>::from_fn(p, p, |i, j| cov[[i, j]]);
        let eig = cov_mat
            .as_ref()
            .self_adjoint_eigen(Side::Lower)
            .map_err(|e| TransformError::Decomposition(format!("{e:?}")))?;

        let diag = eig.S();
        let vectors = eig.U();
        let mut order: Vec<usize> = (0..diag.dim()).collect();
        order.sort_by(|&a, &b| diag[b].total_cmp(&diag[a]));

        let total_variance: f64 = (0..diag.dim()).map(|i| diag[i].max(0.0)).sum();
        let mut components = Array2::<f64>::zeros((self.n_components, p));
        let mut explained_variance = Array1::<f64>::zeros(self.n_components);

        for (row, &idx) in order.iter().take(self.n_components).enumerate() {
            explained_variance[row] = diag[idx].max(0.0);

            // Sign convention: the largest-magnitude loading is positive.
            let pivot = (0..p)
                .max_by(|&a, &b| vectors[(a, idx)].abs().total_cmp(&vectors[(b, idx)].abs()))
                .unwrap_or(0);
            let sign = if vectors[(pivot, idx)] < 0.0 { -1.0 } else { 1.0 };
            for col in 0..p {
                components[[row, col]] = sign * vectors[(col, idx)];
            }
        }

        let explained_variance_ratio = if total_variance > 0.0 {
            explained_variance.mapv(|v| v / total_variance)
        } else {
            Array1::zeros(self.n_components)
        };

        debug!(
            n_samples = n,
            n_features = p,
            n_components = self.n_components,
            retained = explained_variance_ratio.sum(),
            "Fitted PCA"
        );

        Ok(FittedPca {
            mean,
            components,
            explained_variance,
            explained_variance_ratio,
        })
    }
}

/// Principal axes learned by [`Pca::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPca {
    mean: Array1<f64>,
    components: Array2<f64>,
    explained_variance: Array1<f64>,
    explained_variance_ratio: Array1<f64>,
}

impl FittedPca {
    /// Number of input features seen at fit time.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Number of retained components.
    #[must_use]
    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    /// Principal axes, one per row, of shape `(n_components, n_features)`.
    #[must_use]
    pub fn components(&self) -> &Array2<f64> {
        &self.components
    }

    /// Variance along each retained axis.
    #[must_use]
    pub fn explained_variance(&self) -> &Array1<f64> {
        &self.explained_variance
    }

    /// Fraction of total variance along each retained axis.
    #[must_use]
    pub fn explained_variance_ratio(&self) -> &Array1<f64> {
        &self.explained_variance_ratio
    }

    /// Project `x` onto the principal axes.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::FeatureMismatch`] if the column count differs.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(TransformError::FeatureMismatch {
                expected: self.n_features(),
                got: x.ncols(),
            });
        }
        Ok((x - &self.mean).dot(&self.components.t()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn line_data() -> Array2<f64> {
        // points on y = 2x with a small orthogonal wobble
        array![
            [-2.0, -4.0],
            [-1.0, -2.1],
            [0.0, 0.1],
            [1.0, 1.9],
            [2.0, 4.1],
        ]
    }

    #[test]
    fn test_first_axis_follows_line() {
        let pca = Pca::new(2).fit(&line_data()).unwrap();
        let first = pca.components().row(0);
        let expected = 1.0 / 5f64.sqrt();
        assert!((first[0] - expected).abs() < 0.02);
        assert!((first[1] - 2.0 * expected).abs() < 0.02);

        let ratio = pca.explained_variance_ratio();
        assert!(ratio[0] > 0.99);
        assert!(ratio[0] >= ratio[1]);
    }

    #[test]
    fn test_components_orthonormal() {
        let x = Array2::from_shape_fn((12, 4), |(i, j)| ((i * 7 + j * 3) % 5) as f64 + j as f64 * 0.1 * i as f64);
        let pca = Pca::new(3).fit(&x).unwrap();
        let gram = pca.components().dot(&pca.components().t());
        for i in 0..3 {
            for j in 0..3 {
                let target = if i == j { 1.0 } else { 0.0 };
                assert!((gram[[i, j]] - target).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_projection_variance_matches_eigenvalues() {
        let x = line_data();
        let pca = Pca::new(1).fit(&x).unwrap();
        let z = pca.transform(&x).unwrap();
        let var = z.column(0).var(1.0);
        assert!((var - pca.explained_variance()[0]).abs() < 1e-9);
    }

    #[test]
    fn test_too_many_components() {
        let x = Array2::<f64>::zeros((100, 10));
        assert!(matches!(
            Pca::new(20).fit(&x),
            Err(TransformError::TooManyComponents { requested: 20, max: 10 })
        ));
        let x = Array2::<f64>::zeros((5, 10));
        assert!(matches!(
            Pca::new(6).fit(&x),
            Err(TransformError::TooManyComponents { requested: 6, max: 5 })
        ));
    }

    #[test]
    fn test_feature_mismatch_and_zero_components() {
        let pca = Pca::new(1).fit(&line_data()).unwrap();
        assert!(matches!(
            pca.transform(&array![[1.0, 2.0, 3.0]]),
            Err(TransformError::FeatureMismatch { expected: 2, got: 3 })
        ));
        assert!(Pca::new(0).fit(&line_data()).is_err());
    }

    #[test]
    fn test_fit_is_deterministic() {
        let x = line_data();
        assert_eq!(Pca::new(2).fit(&x).unwrap(), Pca::new(2).fit(&x).unwrap());
    }
}
