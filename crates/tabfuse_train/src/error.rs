//! Error types for training.

use thiserror::Error;

/// Result type alias for training operations.
pub type Result<T> = std::result::Result<T, TrainError>;

/// Errors that can occur while fitting or using a classifier.
#[derive(Error, Debug)]
pub enum TrainError {
    /// Inference, evaluation or plotting before a successful fit.
    #[error("Classifier is not fitted; call fit first")]
    NotFitted,

    /// A later fit saw a different number of classes than the network has.
    #[error("Network was built for {expected} classes but the labels have {got}")]
    ClassCountMismatch {
        /// Classes the network was built for.
        expected: usize,
        /// Classes in the new labels.
        got: usize,
    },

    /// Invalid classifier or fit configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Data error.
    #[error("Data error: {0}")]
    DataError(#[from] tabfuse_data::DataError),

    /// Transform error.
    #[error("Transform error: {0}")]
    TransformError(#[from] tabfuse_transforms::TransformError),

    /// Model error.
    #[error("Model error: {0}")]
    ModelError(#[from] tabfuse_models::ModelError),

    /// Analysis error.
    #[error("Analysis error: {0}")]
    AnalysisError(#[from] tabfuse_analysis::AnalysisError),

    /// Core error.
    #[error("Core error: {0}")]
    CoreError(#[from] tabfuse_core::CoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for TrainError {
    fn from(err: serde_json::Error) -> Self {
        TrainError::SerializationError(err.to_string())
    }
}
