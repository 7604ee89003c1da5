//! Per-column standardization.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, TransformError};

/// Unfitted standard scaler.
///
/// Fitting records each column's mean and population standard deviation
/// (`ddof = 0`). Columns with zero variance get a scale of 1.0 so they map
/// to zero instead of NaN.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScaler;

impl StandardScaler {
    /// Create a new scaler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Fit column statistics on `x`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::EmptyData`] if `x` has no rows or columns.
    pub fn fit(&self, x: &Array2<f64>) -> Result<FittedScaler> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(TransformError::EmptyData);
        }

        let mean = x.mean_axis(Axis(0)).ok_or(TransformError::EmptyData)?;
        let std = x.std_axis(Axis(0), 0.0);

        let mut constant = 0usize;
        let scale = std.mapv(|s| {
            if s > 0.0 && s.is_finite() {
                s
            } else {
                constant += 1;
                1.0
            }
        });
        if constant > 0 {
            warn!(columns = constant, "Zero-variance feature columns; using unit scale");
        }

        Ok(FittedScaler { mean, scale })
    }
}

/// Column means and scales learned by [`StandardScaler::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl FittedScaler {
    /// Number of features seen at fit time.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Per-column means.
    #[must_use]
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Per-column scales.
    #[must_use]
    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }

    /// Standardize `x` with the fitted statistics.
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
        Ok((x - &self.mean) / &self.scale)
    }

    /// Undo the standardization.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::FeatureMismatch`] if the column count differs.
    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(TransformError::FeatureMismatch {
                expected: self.n_features(),
                got: x.ncols(),
            });
        }
        Ok(x * &self.scale + &self.mean)
    }
}
