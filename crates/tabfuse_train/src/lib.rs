//! # tabfuse_train
//!
//! Training loop and the pipeline facade for tabfuse.
//!
//! This crate provides:
//! - [`ClassificationTrainer`]: Adam over shuffled batches with per-epoch
//!   validation, recorded in a [`TrainingHistory`]
//! - [`HybridClassifier`]: fit/predict/evaluate over raw tabular features,
//!   owning the fitted transforms and the network
//! - [`HybridClassifierConfig`] and [`FitOptions`], both JSON-loadable
//!
//! ## Example
//!
//! ```rust,ignore
//! use tabfuse_train::{FitOptions, HybridClassifier, HybridClassifierConfig};
//!
//! let mut clf = HybridClassifier::new(HybridClassifierConfig::default());
//! clf.fit(&x, &labels, &FitOptions::default().with_epochs(20))?;
//!
//! let eval = clf.evaluate(&x_test, &labels_test)?;
//! println!("accuracy = {:.3}", eval.accuracy);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod classifier;
mod config;
pub mod error;
mod history;
mod loss;
mod preprocess;
pub mod training;

pub use classifier::{Evaluation, HybridClassifier};
pub use config::{FitOptions, HybridClassifierConfig};
pub use error::{Result, TrainError};
pub use history::{EpochRecord, TrainingHistory};
pub use loss::CategoricalCrossEntropy;
pub use preprocess::FittedPreprocessor;
pub use training::{argmax_indices, ClassificationTrainer, ClassificationTrainerConfig, TrainingOutput};
