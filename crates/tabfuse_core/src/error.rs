//! Error types for tabfuse_core.

use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors that can occur in tabfuse_core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid tensor or array shape provided.
    #[error("Invalid shape: expected {expected}, got {got}")]
    InvalidShape {
        /// Expected shape description.
        expected: String,
        /// Actual shape description.
        got: String,
    },

    /// Shape mismatch between arrays.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Tensor data could not be read back as the requested element type.
    #[error("Tensor conversion failed: {0}")]
    Conversion(String),
}
