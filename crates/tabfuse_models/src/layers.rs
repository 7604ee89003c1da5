//! Building blocks of the hybrid sequence model.

use burn::nn::{Dropout, DropoutConfig, LayerNorm, LayerNormConfig, Linear, LinearConfig, Relu};
use burn::prelude::*;
use burn::tensor::activation::softmax;

/// LayerNorm epsilon used by the transformer block.
pub const LAYER_NORM_EPS: f64 = 1e-6;

/// Multi-head self-attention where every head spans the full model width.
///
/// Queries, keys and values are projected from `d_model` to
/// `n_heads * d_model`, each head runs scaled dot-product attention over the
/// steps, and the concatenated heads are projected back to `d_model`. Any
/// head count is valid for any width.
#[derive(Module, Debug)]
pub struct WideHeadAttention<B: Backend> {
    query: Linear<B>,
    key: Linear<B>,
    value: Linear<B>,
    output: Linear<B>,
    dropout: Dropout,
    #[module(skip)]
    n_heads: usize,
    #[module(skip)]
    head_dim: usize,
}

impl<B: Backend> WideHeadAttention<B> {
    pub fn new(d_model: usize, n_heads: usize, dropout: f64, device: &B::Device) -> Self {
        let inner = n_heads * d_model;
        Self {
            query: LinearConfig::new(d_model, inner).init(device),
            key: LinearConfig::new(d_model, inner).init(device),
            value: LinearConfig::new(d_model, inner).init(device),
            output: LinearConfig::new(inner, d_model).init(device),
            dropout: DropoutConfig::new(dropout).init(),
            n_heads,
            head_dim: d_model,
        }
    }

    /// Split `(batch, steps, n_heads * head_dim)` into `(batch, n_heads, steps, head_dim)`.
    fn split_heads(&self, x: Tensor<B, 3>) -> Tensor<B, 4> {
        let [batch, steps, _] = x.dims();
        x.reshape([batch, steps, self.n_heads, self.head_dim])
            .swap_dims(1, 2)
    }

    /// Attention weights of shape `(batch, n_heads, steps, steps)`; the last
    /// axis sums to one.
    pub fn weights(&self, x: Tensor<B, 3>) -> Tensor<B, 4> {
        let q = self.split_heads(self.query.forward(x.clone()));
        let k = self.split_heads(self.key.forward(x));
        let scores = q.matmul(k.swap_dims(2, 3)) / (self.head_dim as f32).sqrt();
        softmax(scores, 3)
    }

    /// Self-attend over `(batch, steps, d_model)`.
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch, steps, _] = x.dims();
        let v = self.split_heads(self.value.forward(x.clone()));
        let weights = self.dropout.forward(self.weights(x));

        let context = weights
            .matmul(v)
            .swap_dims(1, 2)
            .reshape([batch, steps, self.n_heads * self.head_dim]);
        self.output.forward(context)
    }
}

/// Post-norm transformer encoder block.
///
/// ```text
/// x -> MHA -> Dropout -> (+x) -> LayerNorm -> FF(ReLU) -> Dropout -> Linear -> (+) -> LayerNorm
/// ```
#[derive(Module, Debug)]
pub struct TransformerBlock<B: Backend> {
    attention: WideHeadAttention<B>,
    norm1: LayerNorm<B>,
    ff_linear1: Linear<B>,
    ff_linear2: Linear<B>,
    norm2: LayerNorm<B>,
    dropout: Dropout,
}

impl<B: Backend> TransformerBlock<B> {
    /// Create a block over `d_model` features with `n_heads` full-width heads.
    pub fn new(d_model: usize, n_heads: usize, d_ff: usize, dropout: f64, device: &B::Device) -> Self {
        let attention = WideHeadAttention::new(d_model, n_heads, dropout, device);
        let norm1 = LayerNormConfig::new(d_model)
            .with_epsilon(LAYER_NORM_EPS)
            .init(device);
        let ff_linear1 = LinearConfig::new(d_model, d_ff).init(device);
        let ff_linear2 = LinearConfig::new(d_ff, d_model).init(device);
        let norm2 = LayerNormConfig::new(d_model)
            .with_epsilon(LAYER_NORM_EPS)
            .init(device);

        Self {
            attention,
            norm1,
            ff_linear1,
            ff_linear2,
            norm2,
            dropout: DropoutConfig::new(dropout).init(),
        }
    }

    /// Apply the block to `(batch, steps, d_model)`.
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        // Self-attention with residual
        let attn_out = self.attention.forward(x.clone());
        let x = self.norm1.forward(x + self.dropout.forward(attn_out));

        // Feedforward with residual
        let ff_out = Relu::new().forward(self.ff_linear1.forward(x.clone()));
        let ff_out = self.ff_linear2.forward(self.dropout.forward(ff_out));

        self.norm2.forward(x + ff_out)
    }
}

/// Additive (feed-forward scored) attention over the steps of a sequence.
///
/// Queries and keys are both projections of the input; their concatenation
/// is scored by a small tanh network, the scores are normalized over the
/// step axis, and each step of the input is scaled by its weight.
///
/// The softmax runs over steps since a softmax over the single score unit
/// would always be 1.
#[derive(Module, Debug)]
pub struct AdditiveFusion<B: Backend> {
    query_proj: Linear<B>,
    key_proj: Linear<B>,
    score_hidden: Linear<B>,
    score_out: Linear<B>,
}

impl<B: Backend> AdditiveFusion<B> {
    /// Create the fusion layer for `units` features and an `attention_dim`
    /// scoring width.
    pub fn new(units: usize, attention_dim: usize, device: &B::Device) -> Self {
        Self {
            query_proj: LinearConfig::new(units, units).init(device),
            key_proj: LinearConfig::new(units, units).init(device),
            score_hidden: LinearConfig::new(2 * units, attention_dim).init(device),
            score_out: LinearConfig::new(attention_dim, 1).init(device),
        }
    }

    /// Attention weights of shape `(batch, steps)`; each row sums to one.
    pub fn weights(&self, h: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch, steps, _] = h.dims();

        let query = self.query_proj.forward(h.clone());
        let key = self.key_proj.forward(h);
        let combined = Tensor::cat(vec![query, key], 2);

        let scores = self.score_hidden.forward(combined).tanh();
        let scores = self.score_out.forward(scores).reshape([batch, steps]);

        softmax(scores, 1)
    }

    /// Weight each step of `(batch, steps, units)` by its attention weight.
    pub fn forward(&self, h: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch, steps, units] = h.dims();
        let weights = self
            .weights(h.clone())
            .reshape([batch, steps, 1])
            .expand([batch, steps, units]);
        weights * h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::Distribution;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_transformer_block_shape() {
        let device = Default::default();
        let block = TransformerBlock::<TestBackend>::new(16, 4, 32, 0.1, &device);
        let x = Tensor::random([2, 5, 16], Distribution::Normal(0.0, 1.0), &device);
        assert_eq!(block.forward(x).dims(), [2, 5, 16]);
    }

    #[test]
    fn test_transformer_block_heads_need_not_divide_width() {
        let device = Default::default();
        let block = TransformerBlock::<TestBackend>::new(8, 3, 16, 0.0, &device);
        let x = Tensor::random([2, 4, 8], Distribution::Normal(0.0, 1.0), &device);
        assert_eq!(block.forward(x).dims(), [2, 4, 8]);
    }

    #[test]
    fn test_wide_head_attention_weights() {
        let device = Default::default();
        let attention = WideHeadAttention::<TestBackend>::new(8, 3, 0.0, &device);
        let x = Tensor::random([2, 5, 8], Distribution::Normal(0.0, 1.0), &device);

        let weights = attention.weights(x.clone());
        assert_eq!(weights.dims(), [2, 3, 5, 5]);
        let sums: Vec<f32> = weights.sum_dim(3).into_data().to_vec().unwrap();
        assert_eq!(sums.len(), 2 * 3 * 5);
        for s in sums {
            assert!((s - 1.0).abs() < 1e-5);
        }

        assert_eq!(attention.forward(x).dims(), [2, 5, 8]);
    }

    #[test]
    fn test_fusion_weights_sum_to_one() {
        let device = Default::default();
        let fusion = AdditiveFusion::<TestBackend>::new(8, 4, &device);
        let h = Tensor::random([3, 6, 8], Distribution::Normal(0.0, 1.0), &device);

        let weights = fusion.weights(h.clone());
        assert_eq!(weights.dims(), [3, 6]);
        let sums: Vec<f32> = weights.sum_dim(1).into_data().to_vec().unwrap();
        for s in sums {
            assert!((s - 1.0).abs() < 1e-5);
        }

        assert_eq!(fusion.forward(h).dims(), [3, 6, 8]);
    }

    #[test]
    fn test_fusion_scales_each_step() {
        let device = Default::default();
        let fusion = AdditiveFusion::<TestBackend>::new(4, 2, &device);
        let h = Tensor::<TestBackend, 3>::ones([1, 3, 4], &device);

        let weights: Vec<f32> = fusion.weights(h.clone()).into_data().to_vec().unwrap();
        let out: Vec<f32> = fusion.forward(h).into_data().to_vec().unwrap();
        for step in 0..3 {
            for unit in 0..4 {
                assert!((out[step * 4 + unit] - weights[step]).abs() < 1e-6);
            }
        }
    }
}
