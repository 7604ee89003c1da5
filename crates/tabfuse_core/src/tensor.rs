//! Conversion between `ndarray` arrays and Burn tensors.

use burn::prelude::*;
use burn::tensor::TensorData;
use ndarray::{Array2, Array3};

use crate::error::{CoreError, Result};

/// Convert a `(N, L, C)` array into a Burn tensor on `device`.
pub fn sequence_to_tensor<B: Backend>(x: &Array3<f32>, device: &B::Device) -> Tensor<B, 3> {
    let (n, steps, channels) = x.dim();
    let data: Vec<f32> = x.iter().copied().collect();
    Tensor::from_data(TensorData::new(data, [n, steps, channels]), device)
}

/// Convert a `(N, K)` array into a Burn tensor on `device`.
pub fn matrix_to_tensor<B: Backend>(x: &Array2<f32>, device: &B::Device) -> Tensor<B, 2> {
    let (rows, cols) = x.dim();
    let data: Vec<f32> = x.iter().copied().collect();
    Tensor::from_data(TensorData::new(data, [rows, cols]), device)
}

/// Read a 2-D float tensor back into an array.
///
/// # Errors
///
/// Returns an error if the tensor data cannot be read as `f32`.
pub fn matrix_from_tensor<B: Backend>(tensor: Tensor<B, 2>) -> Result<Array2<f32>> {
    let [rows, cols] = tensor.dims();
    let data: Vec<f32> = tensor
        .into_data()
        .convert::<f32>()
        .to_vec()
        .map_err(|e| CoreError::Conversion(format!("{e:?}")))?;
    Array2::from_shape_vec((rows, cols), data).map_err(|e| CoreError::ShapeMismatch(e.to_string()))
}
