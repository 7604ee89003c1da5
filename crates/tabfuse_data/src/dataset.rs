//! Pseudo-sequence dataset type.

use ndarray::{Array3, ArrayView2, Axis};

use crate::error::{DataError, Result};
use tabfuse_core::SeqShape;

/// A labelled dataset of pseudo-sequences.
///
/// Stores inputs in the `(N, L, C)` format:
/// - `N`: Number of samples
/// - `L`: Steps
/// - `C`: Channels per step
///
/// Targets are encoded class indices in `0..n_classes`.
///
/// # Example
///
/// ```rust
/// use ndarray::Array3;
/// use tabfuse_data::SequenceDataset;
///
/// let x = Array3::<f32>::zeros((4, 20, 1));
/// let ds = SequenceDataset::from_arrays(x, vec![0, 1, 1, 0], 2).unwrap();
/// assert_eq!(ds.len(), 4);
/// assert_eq!(ds.steps(), 20);
/// ```
#[derive(Debug, Clone)]
pub struct SequenceDataset {
    x: Array3<f32>,
    y: Vec<usize>,
    n_classes: usize,
}

impl SequenceDataset {
    /// Create a dataset from an input array and class indices.
    ///
    /// # Errors
    ///
    /// Returns an error if the sample counts differ or a target is not a
    /// valid class index.
    pub fn from_arrays(x: Array3<f32>, y: Vec<usize>, n_classes: usize) -> Result<Self> {
        let n_samples = x.len_of(Axis(0));
        if y.len() != n_samples {
            return Err(DataError::InvalidShape(format!(
                "x has {} samples but y has {} targets",
                n_samples,
                y.len()
            )));
        }
        if let Some(&bad) = y.iter().find(|&&c| c >= n_classes) {
            return Err(DataError::IndexOutOfBounds {
                index: bad,
                length: n_classes,
            });
        }
        Ok(Self { x, y, n_classes })
    }

    /// Get the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// Check if the dataset is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Number of steps per sample.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.x.len_of(Axis(1))
    }

    /// Channels per step.
    #[must_use]
    pub fn channels(&self) -> usize {
        self.x.len_of(Axis(2))
    }

    /// Number of classes the targets index into.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Shape of the whole dataset.
    #[must_use]
    pub fn shape(&self) -> SeqShape {
        SeqShape::new(self.len(), self.steps(), self.channels())
    }

    /// Get a reference to the input data.
    #[must_use]
    pub fn x(&self) -> &Array3<f32> {
        &self.x
    }

    /// Get the class indices.
    #[must_use]
    pub fn y(&self) -> &[usize] {
        &self.y
    }

    /// Get a sample by index.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::IndexOutOfBounds`] for an invalid index.
    pub fn get(&self, index: usize) -> Result<(ArrayView2<'_, f32>, usize)> {
        if index >= self.len() {
            return Err(DataError::IndexOutOfBounds {
                index,
                length: self.len(),
            });
        }
        Ok((self.x.index_axis(Axis(0), index), self.y[index]))
    }

    /// Get a subset of samples by indices.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::IndexOutOfBounds`] for an invalid index.
    pub fn subset(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&idx) = indices.iter().find(|&&i| i >= self.len()) {
            return Err(DataError::IndexOutOfBounds {
                index: idx,
                length: self.len(),
            });
        }
        Ok(Self {
            x: self.x.select(Axis(0), indices),
            y: indices.iter().map(|&i| self.y[i]).collect(),
            n_classes: self.n_classes,
        })
    }
}
