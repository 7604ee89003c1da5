//! Model trait used by the training loop.

use burn::prelude::*;

/// A network mapping pseudo-sequences to class logits.
///
/// Implemented for every backend so the same model type serves training
/// (on an autodiff backend) and inference (on its inner backend).
pub trait ClassificationModel<B: Backend>: Module<B> {
    /// Forward pass returning logits.
    ///
    /// # Arguments
    ///
    /// * `x` - Input tensor of shape (batch, steps, channels)
    ///
    /// # Returns
    ///
    /// Logits tensor of shape (batch, n_classes)
    fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2>;

    /// Forward pass returning class probabilities.
    fn forward_probs(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        burn::tensor::activation::softmax(self.forward(x), 1)
    }
}
