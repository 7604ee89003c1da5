//! Error types for tabfuse_analysis.

use thiserror::Error;

/// Result type alias using [`AnalysisError`].
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur while building reports or figures.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Inputs of different lengths or out-of-range classes.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Drawing failed.
    #[error("Plotting failed: {0}")]
    Plot(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
