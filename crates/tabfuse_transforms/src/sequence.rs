//! Tabular rows as pseudo-sequences.

use ndarray::{Array2, Array3};

/// Reshape an `(n, k)` matrix into an `(n, k, 1)` sequence array.
///
/// Each feature becomes one step with a single channel. Values are
/// narrowed to `f32` for the network.
#[must_use]
pub fn to_sequence(x: &Array2<f64>) -> Array3<f32> {
    let (n, k) = x.dim();
    Array3::from_shape_fn((n, k, 1), |(i, j, _)| x[[i, j]] as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_sequence() {
        let x = Array2::from_shape_fn((2, 3), |(i, j)| (i * 3 + j) as f64);
        let seq = to_sequence(&x);
        assert_eq!(seq.dim(), (2, 3, 1));
        assert_eq!(seq[[1, 2, 0]], 5.0);
        assert_eq!(seq[[0, 1, 0]], 1.0);
    }
}
