//! Error types for tabfuse_transforms.

use thiserror::Error;

/// Result type alias using [`TransformError`].
pub type Result<T> = std::result::Result<T, TransformError>;

/// Errors that can occur while fitting or applying transforms.
#[derive(Error, Debug)]
pub enum TransformError {
    /// No samples were supplied.
    #[error("Cannot fit or transform an empty matrix")]
    EmptyData,

    /// More components requested than the data supports.
    #[error("Requested {requested} components but at most {max} are available (min of samples and features)")]
    TooManyComponents {
        /// Components requested.
        requested: usize,
        /// Upper bound from the training data.
        max: usize,
    },

    /// Input width differs from the width seen at fit time.
    #[error("Expected {expected} features, got {got}")]
    FeatureMismatch {
        /// Feature count seen at fit time.
        expected: usize,
        /// Feature count of the input.
        got: usize,
    },

    /// Invalid transform parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Eigendecomposition failure.
    #[error("Decomposition failed: {0}")]
    Decomposition(String),
}
