//! # tabfuse_transforms
//!
//! Feature transforms fitted on training data and replayed at inference.
//!
//! This crate provides:
//! - [`StandardScaler`] / [`FittedScaler`] for per-column standardization
//! - [`Pca`] / [`FittedPca`] for projection onto principal components
//! - [`ChannelRecalibration`] / [`FittedRecalibration`], a
//!   squeeze-and-excitation style gate over feature channels
//! - [`to_sequence`] to view rows as `(L, 1)` pseudo-sequences
//!
//! Every transform is split into an unfitted configuration and a fitted
//! state, so a transform cannot be applied before it has been fitted.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tabfuse_transforms::{Pca, StandardScaler, to_sequence};
//!
//! let scaler = StandardScaler::new().fit(&x_train)?;
//! let pca = Pca::new(20).fit(&scaler.transform(&x_train)?)?;
//! let seq = to_sequence(&pca.transform(&scaler.transform(&x_test)?)?);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod pca;
mod recalibrate;
mod scaler;
mod sequence;

pub use error::{Result, TransformError};
pub use pca::{FittedPca, Pca};
pub use recalibrate::{ChannelRecalibration, FittedRecalibration, RecalibrationMode};
pub use scaler::{FittedScaler, StandardScaler};
pub use sequence::to_sequence;
