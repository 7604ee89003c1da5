//! # tabfuse_data
//!
//! Label handling and data plumbing for the tabfuse pipeline.
//!
//! This crate provides:
//! - [`LabelEncoder`] / [`FittedLabelEncoder`] mapping labels to class indices
//! - [`RandomOverSampler`] for minority-class oversampling
//! - [`train_test_split`] for shuffled train/validation splits
//! - [`SequenceDataset`] and [`SequenceLoader`] for batched iteration
//! - `.npy` I/O for feature matrices and label vectors
//! - Synthetic classification data for demos and tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use tabfuse_data::{LabelEncoder, RandomOverSampler, train_test_split};
//! use tabfuse_core::Seed;
//!
//! let encoder = LabelEncoder::new().fit(&labels)?;
//! let y = encoder.transform(&labels)?;
//! let (x, y) = RandomOverSampler::new(Seed::new(42)).fit_resample(&x, &y)?;
//! let split = train_test_split(&x, &y, 0.2, Seed::new(42))?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod balance;
mod dataset;
mod error;
mod io;
mod label;
mod loader;
mod splits;
pub mod synthetic;

pub use balance::RandomOverSampler;
pub use dataset::SequenceDataset;
pub use error::{DataError, Result};
pub use io::{read_features_npy, read_labels_npy, write_features_npy, write_labels_npy};
pub use label::{one_hot, FittedLabelEncoder, LabelEncoder};
pub use loader::{SequenceBatch, SequenceLoader, SequenceLoaderBuilder, SequenceLoaderIter};
pub use splits::{train_test_split, TrainTestSplit};
