//! Synthetic classification data.
//!
//! Gaussian blobs around random class centres, optionally imbalanced. Used
//! by the demo command, integration tests and benches.

use ndarray::Array2;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};
use tabfuse_core::Seed;

/// Configuration for Gaussian blob data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobsConfig {
    /// Number of samples.
    pub n_samples: usize,
    /// Number of features per sample.
    pub n_features: usize,
    /// Number of classes.
    pub n_classes: usize,
    /// Scale of the class centres relative to unit noise.
    pub separation: f64,
    /// Relative class frequencies; uniform when `None`.
    pub class_weights: Option<Vec<f64>>,
    /// Random seed.
    pub seed: Seed,
}

impl Default for BlobsConfig {
    fn default() -> Self {
        Self {
            n_samples: 200,
            n_features: 30,
            n_classes: 2,
            separation: 3.0,
            class_weights: None,
            seed: Seed::default(),
        }
    }
}

impl BlobsConfig {
    /// Create a configuration with the given size.
    #[must_use]
    pub fn new(n_samples: usize, n_features: usize, n_classes: usize) -> Self {
        Self {
            n_samples,
            n_features,
            n_classes,
            ..Default::default()
        }
    }

    /// Set the centre scale.
    #[must_use]
    pub fn with_separation(mut self, separation: f64) -> Self {
        self.separation = separation;
        self
    }

    /// Set relative class frequencies.
    #[must_use]
    pub fn with_class_weights(mut self, weights: Vec<f64>) -> Self {
        self.class_weights = Some(weights);
        self
    }

    /// Set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.seed = seed;
        self
    }

    /// Generate features and class indices.
    ///
    /// Class counts follow the weights (rounded down, remainder to the last
    /// class); rows are ordered by class.
    ///
    /// # Errors
    ///
    /// Returns an error for zero sizes or weights that do not match the
    /// class count.
    pub fn generate(&self) -> Result<(Array2<f64>, Vec<usize>)> {
        if self.n_samples == 0 || self.n_features == 0 || self.n_classes == 0 {
            return Err(DataError::EmptyData);
        }
        let weights = match &self.class_weights {
            Some(w) if w.len() != self.n_classes || w.iter().any(|&v| v.is_nan() || v < 0.0) => {
                return Err(DataError::InvalidShape(format!(
                    "expected {} non-negative class weights, got {:?}",
                    self.n_classes, w
                )));
            }
            Some(w) => w.clone(),
            None => vec![1.0; self.n_classes],
        };
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(DataError::InvalidShape("class weights sum to zero".to_string()));
        }

        let mut counts: Vec<usize> = weights
            .iter()
            .map(|w| (w / total * self.n_samples as f64).floor() as usize)
            .collect();
        let assigned: usize = counts.iter().sum();
        if let Some(last) = counts.last_mut() {
            *last += self.n_samples - assigned;
        }

        let mut rng = self.seed.to_rng();
        let centres = Array2::from_shape_simple_fn((self.n_classes, self.n_features), || {
            rng.sample::<f64, _>(StandardNormal) * self.separation
        });

        let y: Vec<usize> = counts
            .iter()
            .enumerate()
            .flat_map(|(class, &n)| std::iter::repeat(class).take(n))
            .collect();
        let x = Array2::from_shape_fn((self.n_samples, self.n_features), |(i, j)| {
            centres[[y[i], j]] + rng.sample::<f64, _>(StandardNormal)
        });

        Ok((x, y))
    }
}
