//! I/O utilities for `.npy` feature and label files.

use std::path::Path;

use ndarray::{Array1, Array2};
use ndarray_npy::{read_npy, write_npy};
use tracing::debug;

use crate::error::{DataError, Result};

/// Read a feature matrix from a NumPy `.npy` file.
///
/// The file should contain a 2-D array of shape (samples, features) stored
/// as `float64` or `float32`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or does not hold a 2-D
/// float array.
pub fn read_features_npy<P: AsRef<Path>>(path: P) -> Result<Array2<f64>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DataError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )));
    }

    let x = match read_npy::<_, Array2<f64>>(path) {
        Ok(arr) => arr,
        Err(e) => read_npy::<_, Array2<f32>>(path)
            .map(|arr| arr.mapv(f64::from))
            .map_err(|_| {
                DataError::FormatError(format!(
                    "Failed to read features from {}: {}",
                    path.display(),
                    e
                ))
            })?,
    };
    debug!(path = %path.display(), shape = ?x.dim(), "Read feature matrix");
    Ok(x)
}

/// Read integer class labels from a NumPy `.npy` file.
///
/// Accepts 1-D `int64` or `int32` arrays, and `float64` arrays whose values
/// are all integral.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a float label has a
/// fractional part.
pub fn read_labels_npy<P: AsRef<Path>>(path: P) -> Result<Vec<i64>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DataError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )));
    }

    if let Ok(arr) = read_npy::<_, Array1<i64>>(path) {
        return Ok(arr.to_vec());
    }
    if let Ok(arr) = read_npy::<_, Array1<i32>>(path) {
        return Ok(arr.iter().map(|&v| i64::from(v)).collect());
    }

    let arr = read_npy::<_, Array1<f64>>(path).map_err(|e| {
        DataError::FormatError(format!(
            "Failed to read labels from {}: {}",
            path.display(),
            e
        ))
    })?;
    arr.iter()
        .map(|&v| {
            if v.fract() == 0.0 && v.is_finite() {
                Ok(v as i64)
            } else {
                Err(DataError::FormatError(format!(
                    "label {v} in {} is not an integer",
                    path.display()
                )))
            }
        })
        .collect()
}

/// Write a feature matrix as a `float64` `.npy` file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_features_npy<P: AsRef<Path>>(path: P, x: &Array2<f64>) -> Result<()> {
    write_npy(path.as_ref(), x).map_err(|e| DataError::FormatError(e.to_string()))
}

/// Write labels as an `int64` `.npy` file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_labels_npy<P: AsRef<Path>>(path: P, y: &[i64]) -> Result<()> {
    let arr = Array1::from(y.to_vec());
    write_npy(path.as_ref(), &arr).map_err(|e| DataError::FormatError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tabfuse_io_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_features_round_trip() {
        let path = temp_path("x.npy");
        let x = Array2::from_shape_fn((4, 3), |(i, j)| i as f64 + 0.5 * j as f64);
        write_features_npy(&path, &x).unwrap();
        assert_eq!(read_features_npy(&path).unwrap(), x);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_features_from_f32() {
        let path = temp_path("x32.npy");
        let x = Array2::from_shape_fn((2, 2), |(i, j)| (i + j) as f32);
        write_npy(&path, &x).unwrap();
        assert_eq!(read_features_npy(&path).unwrap(), x.mapv(f64::from));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_labels_int_and_float() {
        let path = temp_path("y.npy");
        write_labels_npy(&path, &[3, 1, 2]).unwrap();
        assert_eq!(read_labels_npy(&path).unwrap(), vec![3, 1, 2]);

        let path32 = temp_path("y32.npy");
        write_npy(&path32, &Array1::from(vec![5i32, 6])).unwrap();
        assert_eq!(read_labels_npy(&path32).unwrap(), vec![5, 6]);

        let path_f = temp_path("yf.npy");
        write_npy(&path_f, &Array1::from(vec![0.0f64, 1.0])).unwrap();
        assert_eq!(read_labels_npy(&path_f).unwrap(), vec![0, 1]);

        write_npy(&path_f, &Array1::from(vec![0.5f64])).unwrap();
        assert!(matches!(read_labels_npy(&path_f), Err(DataError::FormatError(_))));

        for p in [path, path32, path_f] {
            std::fs::remove_file(p).ok();
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_features_npy(temp_path("missing.npy")),
            Err(DataError::IoError(_))
        ));
    }
}
