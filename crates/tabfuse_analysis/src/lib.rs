//! # tabfuse_analysis
//!
//! Evaluation artefacts for tabfuse classifiers.
//!
//! This crate provides:
//! - [`ConfusionMatrix`] over a fixed set of classes
//! - [`ClassificationReport`] with per-class precision, recall, F1 and
//!   support plus macro and weighted averages
//! - SVG figures: training curves and a confusion-matrix heat map

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod confusion;
mod error;
mod plot;
mod report;

pub use confusion::{confusion_matrix, ConfusionMatrix};
pub use error::{AnalysisError, Result};
pub use plot::{confusion_matrix_figure, training_history_figure, Curve, Figure};
pub use report::{classification_report, ClassMetrics, ClassificationReport};
