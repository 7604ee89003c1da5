//! Loss functions.

use burn::prelude::*;
use burn::tensor::activation::log_softmax;

/// Categorical cross-entropy against one-hot (or soft) targets.
///
/// ```text
/// L = -mean_b( sum_k targets[b, k] * log_softmax(logits)[b, k] )
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoricalCrossEntropy;

impl CategoricalCrossEntropy {
    /// Create a new loss.
    pub fn new() -> Self {
        Self
    }

    /// Compute the mean loss over the batch.
    ///
    /// # Arguments
    ///
    /// * `logits` - Unnormalized scores of shape (batch, n_classes)
    /// * `targets` - Target distribution of shape (batch, n_classes)
    pub fn forward<B: Backend>(&self, logits: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
        (targets * log_softmax(logits, 1)).sum_dim(1).mean().neg()
    }
}
