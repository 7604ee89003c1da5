//! Label encoding.

use std::collections::BTreeSet;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};
use tabfuse_core::ClassLabel;

/// Unfitted label encoder.
///
/// Fitting collects the sorted set of distinct labels; the position of a
/// label in that set is its class index.
///
/// # Example
///
/// ```rust
/// use tabfuse_data::LabelEncoder;
///
/// let encoder = LabelEncoder::new().fit(&["cat", "dog", "cat", "ant"]).unwrap();
/// assert_eq!(encoder.classes(), &["ant", "cat", "dog"]);
/// assert_eq!(encoder.transform(&["dog", "ant"]).unwrap(), vec![2, 0]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelEncoder;

impl LabelEncoder {
    /// Create a new encoder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Fit the encoder on a label vector.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::EmptyData`] if `labels` is empty.
    pub fn fit<L: ClassLabel>(&self, labels: &[L]) -> Result<FittedLabelEncoder<L>> {
        if labels.is_empty() {
            return Err(DataError::EmptyData);
        }
        let classes: BTreeSet<L> = labels.iter().cloned().collect();
        Ok(FittedLabelEncoder {
            classes: classes.into_iter().collect(),
        })
    }
}

/// A fitted label encoder holding the sorted class list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittedLabelEncoder<L> {
    classes: Vec<L>,
}

impl<L: ClassLabel> FittedLabelEncoder<L> {
    /// The fitted classes in index order.
    #[must_use]
    pub fn classes(&self) -> &[L] {
        &self.classes
    }

    /// Number of fitted classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Index of a single label.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnseenLabel`] if the label was not fitted.
    pub fn encode(&self, label: &L) -> Result<usize> {
        self.classes
            .binary_search(label)
            .map_err(|_| DataError::UnseenLabel(label.to_string()))
    }

    /// Label for a single class index.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::IndexOutOfBounds`] for an index past the class list.
    pub fn decode(&self, index: usize) -> Result<&L> {
        self.classes.get(index).ok_or(DataError::IndexOutOfBounds {
            index,
            length: self.classes.len(),
        })
    }

    /// Map labels to class indices.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnseenLabel`] on the first unknown label.
    pub fn transform(&self, labels: &[L]) -> Result<Vec<usize>> {
        labels.iter().map(|l| self.encode(l)).collect()
    }

    /// Map class indices back to labels.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::IndexOutOfBounds`] on the first invalid index.
    pub fn inverse_transform(&self, indices: &[usize]) -> Result<Vec<L>> {
        indices.iter().map(|&i| self.decode(i).cloned()).collect()
    }
}

/// One-hot encode class indices into an `(n, n_classes)` matrix.
///
/// # Errors
///
/// Returns [`DataError::IndexOutOfBounds`] if an index is `>= n_classes`.
pub fn one_hot(indices: &[usize], n_classes: usize) -> Result<Array2<f32>> {
    let mut out = Array2::<f32>::zeros((indices.len(), n_classes));
    for (row, &class) in indices.iter().enumerate() {
        if class >= n_classes {
            return Err(DataError::IndexOutOfBounds {
                index: class,
                length: n_classes,
            });
        }
        out[[row, class]] = 1.0;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_sorted_and_unique() {
        let enc = LabelEncoder::new().fit(&[3, 1, 3, 2, 1]).unwrap();
        assert_eq!(enc.classes(), &[1, 2, 3]);
        assert_eq!(enc.n_classes(), 3);
    }

    #[test]
    fn test_round_trip() {
        let labels = vec!["b".to_string(), "a".to_string(), "c".to_string(), "a".to_string()];
        let enc = LabelEncoder::new().fit(&labels).unwrap();
        let idx = enc.transform(&labels).unwrap();
        assert_eq!(idx, vec![1, 0, 2, 0]);
        assert_eq!(enc.inverse_transform(&idx).unwrap(), labels);
    }

    #[test]
    fn test_unseen_label() {
        let enc = LabelEncoder::new().fit(&["a", "b"]).unwrap();
        let err = enc.transform(&["a", "z"]).unwrap_err();
        assert!(matches!(err, DataError::UnseenLabel(ref l) if l == "z"));
    }

    #[test]
    fn test_decode_out_of_range() {
        let enc = LabelEncoder::new().fit(&[10, 20]).unwrap();
        assert!(matches!(
            enc.inverse_transform(&[0, 2]),
            Err(DataError::IndexOutOfBounds { index: 2, length: 2 })
        ));
    }

    #[test]
    fn test_empty_fit() {
        let empty: [i64; 0] = [];
        assert!(matches!(LabelEncoder::new().fit(&empty), Err(DataError::EmptyData)));
    }

    #[test]
    fn test_one_hot() {
        let m = one_hot(&[0, 2, 1], 3).unwrap();
        assert_eq!(m.dim(), (3, 3));
        assert_eq!(m[[0, 0]], 1.0);
        assert_eq!(m[[1, 2]], 1.0);
        assert_eq!(m[[2, 1]], 1.0);
        assert_eq!(m.sum(), 3.0);
        assert!(one_hot(&[3], 3).is_err());
    }

    #[test]
    fn test_fitted_encoder_serde() {
        let enc = LabelEncoder::new().fit(&[5u8, 1, 9]).unwrap();
        let json = serde_json::to_string(&enc).unwrap();
        let back: FittedLabelEncoder<u8> = serde_json::from_str(&json).unwrap();
        assert_eq!(enc, back);
    }
}
