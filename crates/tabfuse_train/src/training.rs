//! Training loop implementation.

use std::time::Instant;

use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, TrainError};
use crate::history::{EpochRecord, TrainingHistory};
use crate::loss::CategoricalCrossEntropy;
use tabfuse_core::ClassificationModel;
use tabfuse_data::SequenceLoader;

/// Adam epsilon, smaller than Burn's default of 1e-5.
pub const ADAM_EPSILON: f32 = 1e-7;

/// Training output with history and final model.
#[derive(Debug)]
pub struct TrainingOutput<M> {
    /// Model weights after the last epoch.
    pub model: M,
    /// Per-epoch metrics.
    pub history: TrainingHistory,
    /// Total training time in seconds.
    pub training_time_secs: f64,
}

/// Configuration for classification training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationTrainerConfig {
    /// Number of epochs.
    pub n_epochs: usize,
    /// Constant learning rate.
    pub lr: f64,
    /// Log every epoch at `info` instead of `debug`.
    pub verbose: bool,
}

impl Default for ClassificationTrainerConfig {
    fn default() -> Self {
        Self {
            n_epochs: 50,
            lr: 1e-3,
            verbose: true,
        }
    }
}

/// Trainer for classification models.
///
/// Runs Adam at a constant learning rate over shuffled training batches and
/// validates after every epoch. The weights after the final epoch are
/// returned; there is no early stopping or best-epoch rollback.
pub struct ClassificationTrainer<B: AutodiffBackend> {
    config: ClassificationTrainerConfig,
    device: B::Device,
}

impl<B: AutodiffBackend> ClassificationTrainer<B> {
    /// Create a new trainer.
    pub fn new(config: ClassificationTrainerConfig, device: B::Device) -> Self {
        Self { config, device }
    }

    /// The trainer configuration.
    pub fn config(&self) -> &ClassificationTrainerConfig {
        &self.config
    }

    /// Train `model` on `train`, validating on `valid` after every epoch.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::InvalidConfig`] for a non-positive learning rate
    /// and propagates batch construction errors from the loaders.
    pub fn fit<M>(
        &self,
        model: M,
        train: &SequenceLoader,
        valid: &SequenceLoader,
    ) -> Result<TrainingOutput<M>>
    where
        M: AutodiffModule<B> + ClassificationModel<B> + Clone,
        M::InnerModule: ClassificationModel<B::InnerBackend>,
    {
        if !(self.config.lr.is_finite() && self.config.lr > 0.0) {
            return Err(TrainError::InvalidConfig(format!(
                "learning rate must be positive, got {}",
                self.config.lr
            )));
        }

        let start_time = Instant::now();
        let mut optim = AdamConfig::new().with_epsilon(ADAM_EPSILON).init::<B, M>();
        let mut history = TrainingHistory::new();
        let mut model = model;

        debug!(
            train_samples = train.len(),
            valid_samples = valid.len(),
            batches = train.n_batches(),
            "Starting training"
        );

        for epoch in 0..self.config.n_epochs {
            let (train_loss, train_accuracy) = self.train_epoch(&mut model, &mut optim, train, epoch)?;
            let (valid_loss, valid_accuracy) = self.valid_epoch(&model, valid)?;

            let record = EpochRecord {
                epoch: epoch + 1,
                train_loss,
                train_accuracy,
                valid_loss,
                valid_accuracy,
            };
            if self.config.verbose {
                info!(
                    epoch = record.epoch,
                    epochs = self.config.n_epochs,
                    loss = train_loss,
                    accuracy = train_accuracy,
                    val_loss = valid_loss,
                    val_accuracy = valid_accuracy,
                    "Epoch complete"
                );
            } else {
                debug!(
                    epoch = record.epoch,
                    loss = train_loss,
                    val_loss = valid_loss,
                    val_accuracy = valid_accuracy,
                    "Epoch complete"
                );
            }
            history.push(record);
        }

        let training_time_secs = start_time.elapsed().as_secs_f64();
        info!(
            epochs = history.len(),
            seconds = training_time_secs,
            "Training complete"
        );

        Ok(TrainingOutput {
            model,
            history,
            training_time_secs,
        })
    }

    fn train_epoch<M, O>(
        &self,
        model: &mut M,
        optim: &mut O,
        loader: &SequenceLoader,
        epoch: usize,
    ) -> Result<(f64, f64)>
    where
        M: AutodiffModule<B> + ClassificationModel<B> + Clone,
        O: Optimizer<M, B>,
    {
        let loss_fn = CategoricalCrossEntropy::new();
        let mut loss_sum = 0.0f64;
        let mut correct = 0usize;
        let mut seen = 0usize;

        for batch in loader.iter::<B>(&self.device, epoch) {
            let batch = batch?;
            let n = batch.len();

            let logits = model.forward(batch.x);
            let loss = loss_fn.forward(logits.clone(), batch.targets);
            loss_sum += f64::from(loss.clone().into_scalar().elem::<f32>()) * n as f64;
            correct += count_correct(logits, &batch.labels)?;
            seen += n;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &*model);
            *model = optim.step(self.config.lr, model.clone(), grads);
        }

        Ok(averages(loss_sum, correct, seen))
    }

    fn valid_epoch<M>(&self, model: &M, loader: &SequenceLoader) -> Result<(f64, f64)>
    where
        M: AutodiffModule<B>,
        M::InnerModule: ClassificationModel<B::InnerBackend>,
    {
        let inner_model = model.clone().valid();
        let inner_device: <B::InnerBackend as Backend>::Device = self.device.clone();
        let loss_fn = CategoricalCrossEntropy::new();

        let mut loss_sum = 0.0f64;
        let mut correct = 0usize;
        let mut seen = 0usize;

        for batch in loader.iter::<B::InnerBackend>(&inner_device, 0) {
            let batch = batch?;
            let n = batch.len();

            let logits = inner_model.forward(batch.x);
            let loss = loss_fn.forward(logits.clone(), batch.targets);
            loss_sum += f64::from(loss.into_scalar().elem::<f32>()) * n as f64;
            correct += count_correct(logits, &batch.labels)?;
            seen += n;
        }

        Ok(averages(loss_sum, correct, seen))
    }
}

fn averages(loss_sum: f64, correct: usize, seen: usize) -> (f64, f64) {
    if seen == 0 {
        (0.0, 0.0)
    } else {
        (loss_sum / seen as f64, correct as f64 / seen as f64)
    }
}

fn count_correct<B: Backend>(logits: Tensor<B, 2>, labels: &[usize]) -> Result<usize> {
    let preds = argmax_indices(logits)?;
    Ok(preds.iter().zip(labels).filter(|(p, t)| p == t).count())
}

/// Row-wise arg-max of a `(batch, n_classes)` tensor.
///
/// # Errors
///
/// Returns [`TrainError::CoreError`] if the index data cannot be read.
pub fn argmax_indices<B: Backend>(logits: Tensor<B, 2>) -> Result<Vec<usize>> {
    let [batch, _] = logits.dims();
    let indices: Vec<i64> = logits
        .argmax(1)
        .reshape([batch])
        .into_data()
        .convert::<i64>()
        .to_vec()
        .map_err(|e| tabfuse_core::CoreError::Conversion(format!("{e:?}")))?;
    Ok(indices.into_iter().map(|i| i.max(0) as usize).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::TensorData;
    use burn_autodiff::Autodiff;
    use burn_ndarray::NdArray;
    use ndarray::Array3;
    use tabfuse_core::{Seed, Split};
    use tabfuse_data::SequenceDataset;
    use tabfuse_models::HybridSequenceModelConfig;

    type TestBackend = Autodiff<NdArray>;

    fn loaders() -> (SequenceLoader, SequenceLoader) {
        // class 0 sits at -1, class 1 at +1
        let make = |n: usize| {
            let y: Vec<usize> = (0..n).map(|i| i % 2).collect();
            let x = Array3::from_shape_fn((n, 4, 1), |(i, j, _)| {
                let sign = if y[i] == 1 { 1.0 } else { -1.0 };
                sign * (1.0 + 0.05 * j as f32)
            });
            SequenceDataset::from_arrays(x, y, 2).unwrap()
        };
        let train = SequenceLoader::builder(make(32))
            .batch_size(8)
            .shuffle(true)
            .seed(Seed::new(1))
            .build()
            .unwrap();
        let valid = SequenceLoader::builder(make(8))
            .batch_size(8)
            .split(Split::Valid)
            .build()
            .unwrap();
        (train, valid)
    }

    fn small_model(device: &<TestBackend as Backend>::Device) -> tabfuse_models::HybridSequenceModel<TestBackend> {
        HybridSequenceModelConfig::new(4, 2)
            .with_lstm_units(8)
            .with_num_heads(2)
            .with_ff_dim(16)
            .with_attention_dim(4)
            .with_head_units(8)
            .with_dropout(0.0)
            .init(device)
            .unwrap()
    }

    #[test]
    fn test_trainer_config_default() {
        let config = ClassificationTrainerConfig::default();
        assert_eq!(config.n_epochs, 50);
        assert_eq!(config.lr, 1e-3);
    }

    #[test]
    fn test_fit_records_every_epoch() {
        let device = Default::default();
        let (train, valid) = loaders();
        let config = ClassificationTrainerConfig {
            n_epochs: 3,
            lr: 1e-2,
            verbose: false,
        };
        let trainer = ClassificationTrainer::<TestBackend>::new(config, device);
        let output = trainer.fit(small_model(&device), &train, &valid).unwrap();

        assert_eq!(output.history.len(), 3);
        for (i, record) in output.history.epochs().iter().enumerate() {
            assert_eq!(record.epoch, i + 1);
            assert!(record.train_loss.is_finite() && record.train_loss >= 0.0);
            assert!((0.0..=1.0).contains(&record.valid_accuracy));
        }
    }

    #[test]
    fn test_training_reduces_loss() {
        let device = Default::default();
        let (train, valid) = loaders();
        let config = ClassificationTrainerConfig {
            n_epochs: 15,
            lr: 1e-2,
            verbose: false,
        };
        let trainer = ClassificationTrainer::<TestBackend>::new(config, device);
        let output = trainer.fit(small_model(&device), &train, &valid).unwrap();

        let losses = output.history.train_loss();
        assert!(losses[losses.len() - 1] < losses[0]);
    }

    #[test]
    fn test_invalid_learning_rate() {
        let device = Default::default();
        let (train, valid) = loaders();
        let config = ClassificationTrainerConfig {
            n_epochs: 1,
            lr: 0.0,
            verbose: false,
        };
        let trainer = ClassificationTrainer::<TestBackend>::new(config, device);
        assert!(matches!(
            trainer.fit(small_model(&device), &train, &valid),
            Err(TrainError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_argmax_indices() {
        let device = Default::default();
        let logits = Tensor::<NdArray, 2>::from_data(
            TensorData::new(vec![0.1f32, 0.9, 2.0, -1.0, 0.0, 0.0], [3, 2]),
            &device,
        );
        let idx = argmax_indices(logits).unwrap();
        assert_eq!(idx[..2], [1, 0]);
        assert_eq!(idx.len(), 3);
    }
}
