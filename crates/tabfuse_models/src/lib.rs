//! # tabfuse_models
//!
//! The hybrid sequence classifier used by the tabfuse pipeline.
//!
//! [`HybridSequenceModel`] is an explicit stage graph; every stage is a
//! separate method with a declared shape, listed by
//! [`HybridSequenceModelConfig::stages`]:
//!
//! | stage            | shape                   |
//! |------------------|-------------------------|
//! | `encoder`        | `(B, L, C) → (B, L, U)` |
//! | `self_attention` | `(B, L, U) → (B, L, U)` |
//! | `fusion`         | `(B, L, U) → (B, L, U)` |
//! | `decoder`        | `(B, L, U) → (B, U)`    |
//! | `head`           | `(B, U) → (B, K)`       |
//!
//! The model returns logits; probabilities come from
//! [`ClassificationModel::forward_probs`](tabfuse_core::ClassificationModel::forward_probs).

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
pub mod hybrid;
pub mod layers;

pub use error::{ModelError, Result};
pub use hybrid::{HybridSequenceModel, HybridSequenceModelConfig, ModelStage, StageOutputs};
pub use layers::{AdditiveFusion, TransformerBlock, WideHeadAttention};
