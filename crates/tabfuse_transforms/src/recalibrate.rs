//! Squeeze-and-excitation style channel recalibration.
//!
//! Each sample is viewed as a `(1, C)` map over `C` channels. The squeeze is
//! the mean over the singleton spatial axis (the sample itself); the
//! excitation passes it through a two-layer bottleneck
//! `sigmoid(relu(s · W1) · W2)`, and the output is the input scaled by that
//! gate. `W1` is `(C, r)` and `W2` is `(r, C)` with `r = max(1, C / ratio)`,
//! both drawn from a standard normal.

use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TransformError};
use tabfuse_core::Seed;

/// How recalibration weights are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecalibrationMode {
    /// Draw the weights once at fit time and reuse them for every call.
    #[default]
    Fitted,
    /// Draw fresh weights from an unseeded generator on every call.
    ///
    /// Acts as multiplicative noise; outputs are not reproducible.
    Resampled,
}

/// Unfitted channel recalibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecalibration {
    /// Bottleneck reduction ratio.
    pub ratio: usize,
    /// Weight handling.
    pub mode: RecalibrationMode,
    /// Seed for the fitted weights.
    pub seed: Seed,
}

impl Default for ChannelRecalibration {
    fn default() -> Self {
        Self {
            ratio: 16,
            mode: RecalibrationMode::Fitted,
            seed: Seed::default(),
        }
    }
}

impl ChannelRecalibration {
    /// Create a recalibration block with the given reduction ratio.
    #[must_use]
    pub fn new(ratio: usize) -> Self {
        Self {
            ratio,
            ..Default::default()
        }
    }

    /// Set the weight mode.
    #[must_use]
    pub fn with_mode(mut self, mode: RecalibrationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the seed used for fitted weights.
    #[must_use]
    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.seed = seed;
        self
    }

    /// Bottleneck width for `n_channels` channels.
    #[must_use]
    pub fn reduced_channels(&self, n_channels: usize) -> usize {
        (n_channels / self.ratio.max(1)).max(1)
    }

    /// Fix the channel count and draw the weights used by
    /// [`RecalibrationMode::Fitted`].
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidParameter`] for a zero ratio or
    /// zero channels.
    pub fn fit(&self, n_channels: usize) -> Result<FittedRecalibration> {
        if self.ratio == 0 {
            return Err(TransformError::InvalidParameter(
                "recalibration ratio must be at least 1".to_string(),
            ));
        }
        if n_channels == 0 {
            return Err(TransformError::EmptyData);
        }

        let reduced = self.reduced_channels(n_channels);
        let mut rng = self.seed.to_rng();
        let (w1, w2) = draw_weights(&mut rng, n_channels, reduced);
        debug!(n_channels, reduced, mode = ?self.mode, "Fitted channel recalibration");

        Ok(FittedRecalibration {
            mode: self.mode,
            w1,
            w2,
        })
    }
}

/// Recalibration weights fixed at fit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedRecalibration {
    mode: RecalibrationMode,
    w1: Array2<f64>,
    w2: Array2<f64>,
}

impl FittedRecalibration {
    /// Channel count seen at fit time.
    #[must_use]
    pub fn n_channels(&self) -> usize {
        self.w1.nrows()
    }

    /// Bottleneck width.
    #[must_use]
    pub fn reduced_channels(&self) -> usize {
        self.w1.ncols()
    }

    /// Weight mode.
    #[must_use]
    pub fn mode(&self) -> RecalibrationMode {
        self.mode
    }

    /// Squeeze weights `(C, r)`.
    #[must_use]
    pub fn w1(&self) -> &Array2<f64> {
        &self.w1
    }

    /// Excitation weights `(r, C)`.
    #[must_use]
    pub fn w2(&self) -> &Array2<f64> {
        &self.w2
    }

    /// Per-sample channel gates in `(0, 1)`, shape `(n, C)`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::FeatureMismatch`] if the channel count differs.
    pub fn gate(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width(x)?;
        Ok(match self.mode {
            RecalibrationMode::Fitted => excite(x, &self.w1, &self.w2),
            RecalibrationMode::Resampled => {
                let mut rng = ChaCha8Rng::from_entropy();
                let (w1, w2) = draw_weights(&mut rng, self.n_channels(), self.reduced_channels());
                excite(x, &w1, &w2)
            }
        })
    }

    /// Scale each channel of `x` by its gate.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::FeatureMismatch`] if the channel count differs.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let gate = self.gate(x)?;
        Ok(x * &gate)
    }

    fn check_width(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() == self.n_channels() {
            Ok(())
        } else {
            Err(TransformError::FeatureMismatch {
                expected: self.n_channels(),
                got: x.ncols(),
            })
        }
    }
}

fn draw_weights(rng: &mut ChaCha8Rng, channels: usize, reduced: usize) -> (Array2<f64>, Array2<f64>) {
    let mut normal = || rng.sample::<f64, _>(StandardNormal);
    let w1 = Array2::from_shape_simple_fn((channels, reduced), &mut normal);
    let w2 = Array2::from_shape_simple_fn((reduced, channels), &mut normal);
    (w1, w2)
}

fn excite(squeeze: &Array2<f64>, w1: &Array2<f64>, w2: &Array2<f64>) -> Array2<f64> {
    let hidden = squeeze.dot(w1).mapv(|v| v.max(0.0));
    hidden.dot(w2).mapv(|v| 1.0 / (1.0 + (-v).exp()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize, c: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, c), |(i, j)| ((i + 1) as f64 * 0.1) - (j as f64 * 0.02))
    }

    #[test]
    fn test_reduced_channels() {
        let block = ChannelRecalibration::new(16);
        assert_eq!(block.reduced_channels(20), 1);
        assert_eq!(block.reduced_channels(64), 4);
        assert_eq!(block.reduced_channels(3), 1);
    }

    #[test]
    fn test_weight_shapes() {
        let fitted = ChannelRecalibration::new(4).fit(20).unwrap();
        assert_eq!(fitted.w1().dim(), (20, 5));
        assert_eq!(fitted.w2().dim(), (5, 20));
    }

    #[test]
    fn test_gate_in_unit_interval_and_output_shape() {
        let fitted = ChannelRecalibration::default().fit(20).unwrap();
        let x = sample(8, 20);
        let gate = fitted.gate(&x).unwrap();
        assert!(gate.iter().all(|&g| g > 0.0 && g < 1.0));

        let out = fitted.transform(&x).unwrap();
        assert_eq!(out.dim(), (8, 20));
        for ((o, xi), g) in out.iter().zip(x.iter()).zip(gate.iter()) {
            assert!((o - xi * g).abs() < 1e-12);
        }
    }

    #[test]
    fn test_fitted_mode_is_deterministic() {
        let fitted = ChannelRecalibration::default().with_seed(Seed::new(3)).fit(10).unwrap();
        let x = sample(4, 10);
        assert_eq!(fitted.transform(&x).unwrap(), fitted.transform(&x).unwrap());

        let refit = ChannelRecalibration::default().with_seed(Seed::new(3)).fit(10).unwrap();
        assert_eq!(fitted, refit);
    }

    #[test]
    fn test_resampled_mode_redraws() {
        let fitted = ChannelRecalibration::new(2)
            .with_mode(RecalibrationMode::Resampled)
            .fit(16)
            .unwrap();
        let x = sample(4, 16);
        let a = fitted.gate(&x).unwrap();
        let b = fitted.gate(&x).unwrap();
        assert!(a.iter().all(|&g| g > 0.0 && g < 1.0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_errors() {
        assert!(ChannelRecalibration::new(0).fit(4).is_err());
        let fitted = ChannelRecalibration::default().fit(4).unwrap();
        assert!(matches!(
            fitted.transform(&sample(2, 5)),
            Err(TransformError::FeatureMismatch { expected: 4, got: 5 })
        ));
    }
}
