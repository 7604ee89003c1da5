//! Error types for tabfuse_models.

use thiserror::Error;

/// Result type alias using [`ModelError`].
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors that can occur when building models.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Model configuration is inconsistent.
    #[error("Invalid model configuration: {0}")]
    InvalidConfig(String),
}
