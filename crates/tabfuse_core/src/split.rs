//! Pipeline stage tags.

use serde::{Deserialize, Serialize};

/// Which subset of the fit data a loader serves.
///
/// Transforms are fitted on [`Split::Train`] only; validation data is
/// transformed with those parameters.
///
/// ```rust
/// use tabfuse_core::Split;
///
/// assert!(Split::Train.shuffles());
/// assert!(!Split::Valid.shuffles());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Split {
    /// Training subset: transforms are fit here and batches are shuffled.
    #[default]
    Train,
    /// Validation subset carved out of the (balanced) fit data.
    Valid,
}

impl Split {
    /// Whether batches from this split are shuffled.
    #[must_use]
    pub const fn shuffles(&self) -> bool {
        matches!(self, Split::Train)
    }
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Split::Train => write!(f, "train"),
            Split::Valid => write!(f, "valid"),
        }
    }
}
