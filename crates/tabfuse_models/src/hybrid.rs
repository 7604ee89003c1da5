//! HybridSequenceModel: recurrent encoder, self-attention, additive fusion,
//! recurrent decoder and a dense head.

use burn::nn::{
    lstm::{Lstm, LstmConfig},
    Dropout, DropoutConfig, Linear, LinearConfig, Relu,
};
use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::layers::{AdditiveFusion, TransformerBlock};
use tabfuse_core::ClassificationModel;

/// Configuration for [`HybridSequenceModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridSequenceModelConfig {
    /// Steps per input sequence.
    pub seq_len: usize,
    /// Channels per step.
    pub n_channels: usize,
    /// Number of output classes.
    pub n_classes: usize,
    /// Hidden size of both recurrent layers and the attention block.
    pub lstm_units: usize,
    /// Number of attention heads.
    pub num_heads: usize,
    /// Feedforward width inside the attention block.
    pub ff_dim: usize,
    /// Dropout rate.
    pub dropout: f64,
    /// Scoring width of the additive fusion.
    pub attention_dim: usize,
    /// Width of the hidden dense layer in the head.
    pub head_units: usize,
}

impl Default for HybridSequenceModelConfig {
    fn default() -> Self {
        Self {
            seq_len: 20,
            n_channels: 1,
            n_classes: 2,
            lstm_units: 64,
            num_heads: 4,
            ff_dim: 128,
            dropout: 0.2,
            attention_dim: 32,
            head_units: 128,
        }
    }
}

impl HybridSequenceModelConfig {
    /// Create a new config for sequences of `seq_len` single-channel steps.
    pub fn new(seq_len: usize, n_classes: usize) -> Self {
        Self {
            seq_len,
            n_classes,
            ..Default::default()
        }
    }

    /// Set channels per step.
    #[must_use]
    pub fn with_n_channels(mut self, n_channels: usize) -> Self {
        self.n_channels = n_channels;
        self
    }

    /// Set the recurrent hidden size.
    #[must_use]
    pub fn with_lstm_units(mut self, lstm_units: usize) -> Self {
        self.lstm_units = lstm_units;
        self
    }

    /// Set number of attention heads.
    #[must_use]
    pub fn with_num_heads(mut self, num_heads: usize) -> Self {
        self.num_heads = num_heads;
        self
    }

    /// Set the feedforward width.
    #[must_use]
    pub fn with_ff_dim(mut self, ff_dim: usize) -> Self {
        self.ff_dim = ff_dim;
        self
    }

    /// Set dropout rate.
    #[must_use]
    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    /// Set the additive attention scoring width.
    #[must_use]
    pub fn with_attention_dim(mut self, attention_dim: usize) -> Self {
        self.attention_dim = attention_dim;
        self
    }

    /// Set the hidden width of the head.
    #[must_use]
    pub fn with_head_units(mut self, head_units: usize) -> Self {
        self.head_units = head_units;
        self
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] for zero sizes or dropout
    /// outside `[0, 1)`.
    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("seq_len", self.seq_len),
            ("n_channels", self.n_channels),
            ("n_classes", self.n_classes),
            ("lstm_units", self.lstm_units),
            ("num_heads", self.num_heads),
            ("ff_dim", self.ff_dim),
            ("attention_dim", self.attention_dim),
            ("head_units", self.head_units),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(ModelError::InvalidConfig(format!("{name} must be at least 1")));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ModelError::InvalidConfig(format!(
                "dropout must be in [0, 1), got {}",
                self.dropout
            )));
        }
        Ok(())
    }

    /// Declared per-stage shapes, batch dimension omitted.
    pub fn stages(&self) -> Vec<ModelStage> {
        let (l, c, u, k) = (self.seq_len, self.n_channels, self.lstm_units, self.n_classes);
        vec![
            ModelStage::new("encoder", vec![l, c], vec![l, u]),
            ModelStage::new("self_attention", vec![l, u], vec![l, u]),
            ModelStage::new("fusion", vec![l, u], vec![l, u]),
            ModelStage::new("decoder", vec![l, u], vec![u]),
            ModelStage::new("head", vec![u], vec![k]),
        ]
    }

    /// Initialize the model.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if [`validate`](Self::validate) fails.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<HybridSequenceModel<B>> {
        self.validate()?;
        Ok(HybridSequenceModel::new(self, device))
    }
}

/// One stage of the model graph with its per-sample shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelStage {
    /// Stage name, matching the model method that runs it.
    pub name: &'static str,
    /// Input shape without the batch dimension.
    pub input: Vec<usize>,
    /// Output shape without the batch dimension.
    pub output: Vec<usize>,
}

impl ModelStage {
    fn new(name: &'static str, input: Vec<usize>, output: Vec<usize>) -> Self {
        Self { name, input, output }
    }
}

/// Outputs of every stage of one forward pass.
#[derive(Debug, Clone)]
pub struct StageOutputs<B: Backend> {
    /// Encoder output `(B, L, U)`.
    pub encoder: Tensor<B, 3>,
    /// Self-attention output `(B, L, U)`.
    pub self_attention: Tensor<B, 3>,
    /// Fusion output `(B, L, U)`.
    pub fusion: Tensor<B, 3>,
    /// Decoder final state `(B, U)`.
    pub decoder: Tensor<B, 2>,
    /// Logits `(B, K)`.
    pub logits: Tensor<B, 2>,
}

/// Hybrid recurrent/attention classifier over pseudo-sequences.
///
/// # Architecture
///
/// ```text
/// Input (B, L, C)
///       |
///       +---> [LSTM, all steps]            (B, L, U)
///       |
///       +---> [Transformer block]          (B, L, U)
///       |
///       +---> [Additive fusion]            (B, L, U)
///       |
///       +---> [LSTM, final state]          (B, U)
///       |
///       +---> [Linear+ReLU -> Dropout -> Linear] -> Logits (B, K)
/// ```
///
/// # Example
///
/// ```rust,ignore
/// use tabfuse_models::HybridSequenceModelConfig;
///
/// let model = HybridSequenceModelConfig::new(20, 3).init::<NdArray>(&device)?;
/// let x = Tensor::random([32, 20, 1], Distribution::Normal(0.0, 1.0), &device);
/// let logits = model.forward(x);
/// // logits shape: [32, 3]
/// ```
#[derive(Module, Debug)]
pub struct HybridSequenceModel<B: Backend> {
    encoder: Lstm<B>,
    attention: TransformerBlock<B>,
    fusion: AdditiveFusion<B>,
    decoder: Lstm<B>,
    head_hidden: Linear<B>,
    head_out: Linear<B>,
    dropout: Dropout,
    #[module(skip)]
    seq_len: usize,
    #[module(skip)]
    n_channels: usize,
    #[module(skip)]
    n_classes: usize,
    #[module(skip)]
    lstm_units: usize,
    #[module(skip)]
    num_heads: usize,
    #[module(skip)]
    ff_dim: usize,
    #[module(skip)]
    dropout_rate: f64,
    #[module(skip)]
    attention_dim: usize,
    #[module(skip)]
    head_units: usize,
}

impl<B: Backend> HybridSequenceModel<B> {
    fn new(config: &HybridSequenceModelConfig, device: &B::Device) -> Self {
        let units = config.lstm_units;
        Self {
            encoder: LstmConfig::new(config.n_channels, units, true).init(device),
            attention: TransformerBlock::new(units, config.num_heads, config.ff_dim, config.dropout, device),
            fusion: AdditiveFusion::new(units, config.attention_dim, device),
            decoder: LstmConfig::new(units, units, true).init(device),
            head_hidden: LinearConfig::new(units, config.head_units).init(device),
            head_out: LinearConfig::new(config.head_units, config.n_classes).init(device),
            dropout: DropoutConfig::new(config.dropout).init(),
            seq_len: config.seq_len,
            n_channels: config.n_channels,
            n_classes: config.n_classes,
            lstm_units: units,
            num_heads: config.num_heads,
            ff_dim: config.ff_dim,
            dropout_rate: config.dropout,
            attention_dim: config.attention_dim,
            head_units: config.head_units,
        }
    }

    /// The configuration the model was built from.
    pub fn config(&self) -> HybridSequenceModelConfig {
        HybridSequenceModelConfig {
            seq_len: self.seq_len,
            n_channels: self.n_channels,
            n_classes: self.n_classes,
            lstm_units: self.lstm_units,
            num_heads: self.num_heads,
            ff_dim: self.ff_dim,
            dropout: self.dropout_rate,
            attention_dim: self.attention_dim,
            head_units: self.head_units,
        }
    }

    /// Number of output classes.
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Declared per-stage shapes.
    pub fn stages(&self) -> Vec<ModelStage> {
        self.config().stages()
    }

    /// Recurrent encoder returning every step.
    pub fn encoder(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let (output, _) = self.encoder.forward(x, None);
        output
    }

    /// Transformer block.
    pub fn self_attention(&self, h: Tensor<B, 3>) -> Tensor<B, 3> {
        self.attention.forward(h)
    }

    /// Additive attention fusion.
    pub fn fusion(&self, h: Tensor<B, 3>) -> Tensor<B, 3> {
        self.fusion.forward(h)
    }

    /// Recurrent decoder returning the final hidden state.
    pub fn decoder(&self, h: Tensor<B, 3>) -> Tensor<B, 2> {
        let (_, state) = self.decoder.forward(h, None);
        state.hidden
    }

    /// Dense head producing logits.
    pub fn head(&self, h: Tensor<B, 2>) -> Tensor<B, 2> {
        let h = Relu::new().forward(self.head_hidden.forward(h));
        self.head_out.forward(self.dropout.forward(h))
    }

    /// Forward pass keeping every stage's output.
    pub fn forward_traced(&self, x: Tensor<B, 3>) -> StageOutputs<B> {
        let encoder = self.encoder(x);
        let self_attention = self.self_attention(encoder.clone());
        let fusion = self.fusion(self_attention.clone());
        let decoder = self.decoder(fusion.clone());
        let logits = self.head(decoder.clone());
        StageOutputs {
            encoder,
            self_attention,
            fusion,
            decoder,
            logits,
        }
    }

    /// Forward pass returning logits.
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let h = self.encoder(x);
        let h = self.self_attention(h);
        let h = self.fusion(h);
        let h = self.decoder(h);
        self.head(h)
    }
}

impl<B: Backend> ClassificationModel<B> for HybridSequenceModel<B> {
    fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        HybridSequenceModel::forward(self, x)
    }
}
