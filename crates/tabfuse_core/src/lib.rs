//! # tabfuse_core
//!
//! Core types shared by every tabfuse crate.
//!
//! This crate provides:
//! - [`Seed`] for deterministic, derivable random streams
//! - [`Split`] to tag which stage of the pipeline data belongs to
//! - [`ClassLabel`] for the caller's label domain
//! - [`SeqShape`] describing pseudo-sequence tensors
//! - Conversion helpers between `ndarray` arrays and Burn tensors
//! - [`ClassificationModel`] implemented by trainable networks
//!
//! ## Shape Convention
//!
//! Sequence tensors follow `(B, L, C)`:
//! - `B`: Batch size (number of samples)
//! - `L`: Steps (reduced feature count when features are read as a sequence)
//! - `C`: Channels per step (1 for tabular pseudo-sequences)
//!
//! ## Example
//!
//! ```rust,ignore
//! use tabfuse_core::{Seed, SeqShape};
//!
//! let seed = Seed::new(42);
//! let shape = SeqShape::new(32, 20, 1); // batch=32, steps=20, channels=1
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod label;
mod model_trait;
mod seed;
mod shape;
mod split;
mod tensor;

pub use error::{CoreError, Result};
pub use label::ClassLabel;
pub use model_trait::ClassificationModel;
pub use seed::Seed;
pub use shape::SeqShape;
pub use split::Split;
pub use tensor::{matrix_from_tensor, matrix_to_tensor, sequence_to_tensor};

/// Backend type aliases for convenience.
pub mod backend {
    pub use burn_ndarray::NdArray;
}
