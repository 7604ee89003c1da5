//! Dataloader for batched iteration.

use burn::prelude::*;
use burn::tensor::TensorData;
use ndarray::Axis;
use rand::seq::SliceRandom;

use crate::dataset::SequenceDataset;
use crate::error::{DataError, Result};
use crate::label::one_hot;
use tabfuse_core::{sequence_to_tensor, Seed, Split};

/// A batch of pseudo-sequences with one-hot targets.
#[derive(Debug, Clone)]
pub struct SequenceBatch<B: Backend> {
    /// Inputs of shape (batch, steps, channels).
    pub x: Tensor<B, 3>,
    /// One-hot targets of shape (batch, n_classes).
    pub targets: Tensor<B, 2>,
    /// Class indices of the batch rows.
    pub labels: Vec<usize>,
}

impl<B: Backend> SequenceBatch<B> {
    /// Number of samples in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the batch holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// A dataloader that produces batches from a dataset.
///
/// Shuffling, when enabled, draws a fresh order every epoch from
/// `seed.for_epoch(epoch)`, so runs are reproducible. Unless set
/// explicitly, training loaders shuffle and validation loaders do not.
///
/// # Example
///
/// ```rust,ignore
/// use tabfuse_data::{SequenceDataset, SequenceLoader};
/// use tabfuse_core::Seed;
///
/// let loader = SequenceLoader::builder(dataset)
///     .batch_size(32)
///     .shuffle(true)
///     .seed(Seed::new(42))
///     .build()?;
///
/// for batch in loader.iter::<B>(&device, epoch) {
///     let batch = batch?;
///     // process batch
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SequenceLoader {
    dataset: SequenceDataset,
    batch_size: usize,
    shuffle: bool,
    seed: Seed,
    split: Split,
}

impl SequenceLoader {
    /// Create a new dataloader builder.
    #[must_use]
    pub fn builder(dataset: SequenceDataset) -> SequenceLoaderBuilder {
        SequenceLoaderBuilder::new(dataset)
    }

    /// Get the dataset.
    #[must_use]
    pub fn dataset(&self) -> &SequenceDataset {
        &self.dataset
    }

    /// Get the batch size.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Get the number of batches. The last batch may be partial.
    #[must_use]
    pub fn n_batches(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size)
    }

    /// Get the total number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// Check if the loader is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Get the data split type.
    #[must_use]
    pub fn split(&self) -> Split {
        self.split
    }

    /// Sample order for an epoch.
    #[must_use]
    pub fn epoch_order(&self, epoch: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.dataset.len()).collect();
        if self.shuffle {
            indices.shuffle(&mut self.seed.for_epoch(epoch).to_rng());
        }
        indices
    }

    /// Create an iterator over the batches of one epoch.
    ///
    /// # Type Parameters
    ///
    /// * `B` - The Burn backend to use for tensors
    #[must_use]
    pub fn iter<B: Backend>(&self, device: &B::Device, epoch: usize) -> SequenceLoaderIter<'_, B> {
        SequenceLoaderIter {
            loader: self,
            device: device.clone(),
            indices: self.epoch_order(epoch),
            current_batch: 0,
            n_batches: self.n_batches(),
        }
    }
}

/// Builder for [`SequenceLoader`].
#[derive(Debug)]
pub struct SequenceLoaderBuilder {
    dataset: SequenceDataset,
    batch_size: usize,
    shuffle: Option<bool>,
    seed: Seed,
    split: Split,
}

impl SequenceLoaderBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new(dataset: SequenceDataset) -> Self {
        Self {
            dataset,
            batch_size: 32,
            shuffle: None,
            seed: Seed::default(),
            split: Split::Train,
        }
    }

    /// Set the batch size.
    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Enable or disable shuffling.
    #[must_use]
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = Some(shuffle);
        self
    }

    /// Set the random seed for shuffling.
    #[must_use]
    pub fn seed(mut self, seed: Seed) -> Self {
        self.seed = seed;
        self
    }

    /// Set the data split type.
    #[must_use]
    pub fn split(mut self, split: Split) -> Self {
        self.split = split;
        self
    }

    /// Build the dataloader.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero batch size or an empty dataset.
    pub fn build(self) -> Result<SequenceLoader> {
        if self.batch_size == 0 {
            return Err(DataError::InvalidBatchSize(
                "Batch size must be greater than 0".to_string(),
            ));
        }
        if self.dataset.is_empty() {
            return Err(DataError::EmptyData);
        }

        Ok(SequenceLoader {
            dataset: self.dataset,
            batch_size: self.batch_size,
            shuffle: self.shuffle.unwrap_or_else(|| self.split.shuffles()),
            seed: self.seed,
            split: self.split,
        })
    }
}

/// Iterator over the batches of a [`SequenceLoader`].
pub struct SequenceLoaderIter<'a, B: Backend> {
    loader: &'a SequenceLoader,
    device: B::Device,
    indices: Vec<usize>,
    current_batch: usize,
    n_batches: usize,
}

impl<'a, B: Backend> Iterator for SequenceLoaderIter<'a, B> {
    type Item = Result<SequenceBatch<B>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_batch >= self.n_batches {
            return None;
        }

        let start = self.current_batch * self.loader.batch_size;
        let end = std::cmp::min(start + self.loader.batch_size, self.indices.len());
        self.current_batch += 1;

        Some(self.create_batch(start, end))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.n_batches - self.current_batch;
        (remaining, Some(remaining))
    }
}

impl<'a, B: Backend> ExactSizeIterator for SequenceLoaderIter<'a, B> {}

impl<'a, B: Backend> SequenceLoaderIter<'a, B> {
    fn create_batch(&self, start: usize, end: usize) -> Result<SequenceBatch<B>> {
        let dataset = &self.loader.dataset;
        let rows = &self.indices[start..end];

        let x = dataset.x().select(Axis(0), rows);
        let labels: Vec<usize> = rows.iter().map(|&i| dataset.y()[i]).collect();
        let targets = one_hot(&labels, dataset.n_classes())?;

        let [batch, n_classes] = [targets.nrows(), targets.ncols()];
        let target_data: Vec<f32> = targets.iter().copied().collect();

        Ok(SequenceBatch {
            x: sequence_to_tensor(&x, &self.device),
            targets: Tensor::from_data(TensorData::new(target_data, [batch, n_classes]), &self.device),
            labels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;
    use ndarray::Array3;

    type TestBackend = NdArray;

    fn create_test_dataset(n: usize) -> SequenceDataset {
        let x = Array3::from_shape_fn((n, 4, 1), |(i, _, _)| i as f32);
        let y = (0..n).map(|i| i % 2).collect();
        SequenceDataset::from_arrays(x, y, 2).unwrap()
    }

    #[test]
    fn test_loader_builder() {
        let loader = SequenceLoader::builder(create_test_dataset(100))
            .batch_size(32)
            .shuffle(true)
            .build()
            .unwrap();

        assert_eq!(loader.batch_size(), 32);
        assert_eq!(loader.n_batches(), 4); // ceil(100/32) = 4
    }

    #[test]
    fn test_batches_cover_dataset() {
        let loader = SequenceLoader::builder(create_test_dataset(10))
            .batch_size(4)
            .shuffle(false)
            .build()
            .unwrap();
        let device = Default::default();

        let batches: Vec<_> = loader
            .iter::<TestBackend>(&device, 0)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[2].len(), 2);
        assert_eq!(batches[0].x.dims(), [4, 4, 1]);
        assert_eq!(batches[0].targets.dims(), [4, 2]);
        assert_eq!(batches[0].labels, vec![0, 1, 0, 1]);

        let targets: Vec<f32> = batches[0].targets.clone().into_data().to_vec().unwrap();
        assert_eq!(targets, vec![1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_shuffle_per_epoch() {
        let loader = SequenceLoader::builder(create_test_dataset(50))
            .shuffle(true)
            .seed(Seed::new(42))
            .build()
            .unwrap();

        let first = loader.epoch_order(0);
        assert_eq!(first, loader.epoch_order(0));
        assert_ne!(first, loader.epoch_order(1));

        let mut sorted = first.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_no_shuffle_keeps_order() {
        let loader = SequenceLoader::builder(create_test_dataset(5))
            .split(Split::Valid)
            .build()
            .unwrap();
        assert_eq!(loader.epoch_order(3), vec![0, 1, 2, 3, 4]);
        assert_eq!(loader.split(), Split::Valid);
    }

    #[test]
    fn test_train_split_shuffles_by_default() {
        let loader = SequenceLoader::builder(create_test_dataset(30))
            .seed(Seed::new(7))
            .build()
            .unwrap();
        assert_eq!(loader.split(), Split::Train);
        assert_ne!(loader.epoch_order(0), (0..30).collect::<Vec<_>>());
    }

    #[test]
    fn test_invalid_builder() {
        assert!(SequenceLoader::builder(create_test_dataset(5))
            .batch_size(0)
            .build()
            .is_err());
    }
}
