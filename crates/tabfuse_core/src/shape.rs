//! Pseudo-sequence shape metadata.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Shape of a sequence tensor in `(B, L, C)` order.
///
/// Tabular rows are read as sequences of `L` steps with `C` channels each;
/// after dimensionality reduction `L` is the component count and `C` is 1.
///
/// ```rust
/// use tabfuse_core::SeqShape;
///
/// let shape = SeqShape::new(32, 20, 1);
/// assert_eq!(shape.steps(), 20);
/// assert_eq!(shape.numel(), 640);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeqShape {
    batch: usize,
    steps: usize,
    channels: usize,
}

impl SeqShape {
    /// Create a new shape.
    #[must_use]
    pub const fn new(batch: usize, steps: usize, channels: usize) -> Self {
        Self {
            batch,
            steps,
            channels,
        }
    }

    /// Create a shape from a dimension slice `[batch, steps, channels]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice does not hold exactly three dimensions.
    pub fn from_dims(dims: &[usize]) -> Result<Self> {
        match dims {
            [batch, steps, channels] => Ok(Self::new(*batch, *steps, *channels)),
            _ => Err(CoreError::InvalidShape {
                expected: "[batch, steps, channels]".to_string(),
                got: format!("{dims:?}"),
            }),
        }
    }

    /// Batch size.
    #[must_use]
    pub const fn batch(&self) -> usize {
        self.batch
    }

    /// Number of steps.
    #[must_use]
    pub const fn steps(&self) -> usize {
        self.steps
    }

    /// Channels per step.
    #[must_use]
    pub const fn channels(&self) -> usize {
        self.channels
    }

    /// Total number of elements.
    #[must_use]
    pub const fn numel(&self) -> usize {
        self.batch * self.steps * self.channels
    }

    /// Whether any dimension is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.batch == 0 || self.steps == 0 || self.channels == 0
    }

    /// The same shape with a different batch size.
    #[must_use]
    pub const fn with_batch(&self, batch: usize) -> Self {
        Self::new(batch, self.steps, self.channels)
    }

    /// Dimensions as an array.
    #[must_use]
    pub const fn as_array(&self) -> [usize; 3] {
        [self.batch, self.steps, self.channels]
    }
}

impl std::fmt::Display for SeqShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(B={}, L={}, C={})",
            self.batch, self.steps, self.channels
        )
    }
}
