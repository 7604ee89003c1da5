//! Configuration for the hybrid classifier pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainError};
use crate::training::ClassificationTrainerConfig;
use tabfuse_core::Seed;
use tabfuse_models::HybridSequenceModelConfig;
use tabfuse_transforms::{ChannelRecalibration, RecalibrationMode};

/// Hyperparameters of a [`HybridClassifier`](crate::HybridClassifier).
///
/// Missing fields take their default when loaded from JSON, so a config
/// file only needs the values it changes:
///
/// ```rust
/// use tabfuse_train::HybridClassifierConfig;
///
/// let config: HybridClassifierConfig =
///     serde_json::from_str(r#"{ "n_components": 8, "lstm_units": 32 }"#).unwrap();
/// assert_eq!(config.n_components, 8);
/// assert_eq!(config.num_heads, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridClassifierConfig {
    /// Principal components kept; also the pseudo-sequence length.
    pub n_components: usize,
    /// Hidden size of the recurrent layers and the attention block.
    pub lstm_units: usize,
    /// Attention heads, each `lstm_units` wide.
    pub num_heads: usize,
    /// Feedforward width inside the attention block.
    pub ff_dim: usize,
    /// Dropout rate in `[0, 1)`.
    pub dropout: f64,
    /// Master seed for balancing, splitting, shuffling and weights.
    pub seed: Seed,
    /// Channel recalibration reduction ratio.
    pub se_ratio: usize,
    /// Scoring width of the additive fusion.
    pub attention_dim: usize,
    /// Width of the hidden dense layer in the head.
    pub head_units: usize,
    /// Adam learning rate.
    pub learning_rate: f64,
    /// Channel recalibration weight handling.
    pub recalibration: RecalibrationMode,
    /// Log every epoch at `info`.
    pub verbose: bool,
}

impl Default for HybridClassifierConfig {
    fn default() -> Self {
        Self {
            n_components: 20,
            lstm_units: 64,
            num_heads: 4,
            ff_dim: 128,
            dropout: 0.2,
            seed: Seed::new(42),
            se_ratio: 16,
            attention_dim: 32,
            head_units: 128,
            learning_rate: 1e-3,
            recalibration: RecalibrationMode::Fitted,
            verbose: true,
        }
    }
}

impl HybridClassifierConfig {
    /// Create a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read and
    /// [`TrainError::SerializationError`] if it is not a valid config.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Write the config as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Set the number of principal components.
    #[must_use]
    pub fn with_n_components(mut self, n_components: usize) -> Self {
        self.n_components = n_components;
        self
    }

    /// Set the recurrent hidden size.
    #[must_use]
    pub fn with_lstm_units(mut self, lstm_units: usize) -> Self {
        self.lstm_units = lstm_units;
        self
    }

    /// Set the number of attention heads.
    #[must_use]
    pub fn with_num_heads(mut self, num_heads: usize) -> Self {
        self.num_heads = num_heads;
        self
    }

    /// Set the attention feedforward width.
    #[must_use]
    pub fn with_ff_dim(mut self, ff_dim: usize) -> Self {
        self.ff_dim = ff_dim;
        self
    }

    /// Set the dropout rate.
    #[must_use]
    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    /// Set the master seed.
    #[must_use]
    pub fn with_seed(mut self, seed: impl Into<Seed>) -> Self {
        self.seed = seed.into();
        self
    }

    /// Set the recalibration reduction ratio.
    #[must_use]
    pub fn with_se_ratio(mut self, se_ratio: usize) -> Self {
        self.se_ratio = se_ratio;
        self
    }

    /// Set the additive fusion scoring width.
    #[must_use]
    pub fn with_attention_dim(mut self, attention_dim: usize) -> Self {
        self.attention_dim = attention_dim;
        self
    }

    /// Set the head's hidden width.
    #[must_use]
    pub fn with_head_units(mut self, head_units: usize) -> Self {
        self.head_units = head_units;
        self
    }

    /// Set the learning rate.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the recalibration mode.
    #[must_use]
    pub fn with_recalibration(mut self, recalibration: RecalibrationMode) -> Self {
        self.recalibration = recalibration;
        self
    }

    /// Enable or disable per-epoch `info` logging.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Check the pipeline-level parameters.
    ///
    /// Network sizes are checked by
    /// [`HybridSequenceModelConfig::validate`] once the class count is known.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::InvalidConfig`] for zero components, a zero
    /// recalibration ratio or a non-positive learning rate.
    pub fn validate(&self) -> Result<()> {
        if self.n_components == 0 {
            return Err(TrainError::InvalidConfig(
                "n_components must be at least 1".to_string(),
            ));
        }
        if self.se_ratio == 0 {
            return Err(TrainError::InvalidConfig("se_ratio must be at least 1".to_string()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(TrainError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    /// Network configuration for `n_classes` classes.
    pub fn model_config(&self, n_classes: usize) -> HybridSequenceModelConfig {
        HybridSequenceModelConfig::new(self.n_components, n_classes)
            .with_lstm_units(self.lstm_units)
            .with_num_heads(self.num_heads)
            .with_ff_dim(self.ff_dim)
            .with_dropout(self.dropout)
            .with_attention_dim(self.attention_dim)
            .with_head_units(self.head_units)
    }

    /// Unfitted recalibration block.
    pub fn recalibration(&self) -> ChannelRecalibration {
        ChannelRecalibration::new(self.se_ratio)
            .with_mode(self.recalibration)
            .with_seed(self.seed.derive("recalibration"))
    }

    /// Trainer configuration for a run of `epochs` epochs.
    pub fn trainer_config(&self, epochs: usize) -> ClassificationTrainerConfig {
        ClassificationTrainerConfig {
            n_epochs: epochs,
            lr: self.learning_rate,
            verbose: self.verbose,
        }
    }
}

/// Per-call options for [`HybridClassifier::fit`](crate::HybridClassifier::fit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Training epochs.
    pub epochs: usize,
    /// Mini-batch size.
    pub batch_size: usize,
    /// Fraction of the (balanced) data held out for validation.
    pub validation_split: f64,
    /// Oversample minority classes before splitting.
    pub class_balance: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            epochs: 50,
            batch_size: 32,
            validation_split: 0.2,
            class_balance: true,
        }
    }
}

impl FitOptions {
    /// Create options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of epochs.
    #[must_use]
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Set the batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the validation fraction.
    #[must_use]
    pub fn with_validation_split(mut self, validation_split: f64) -> Self {
        self.validation_split = validation_split;
        self
    }

    /// Enable or disable oversampling.
    #[must_use]
    pub fn with_class_balance(mut self, class_balance: bool) -> Self {
        self.class_balance = class_balance;
        self
    }

    /// Check the options.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::InvalidConfig`] for zero epochs, a zero batch
    /// size or a validation fraction outside `(0, 1)`.
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(TrainError::InvalidConfig("epochs must be at least 1".to_string()));
        }
        if self.batch_size == 0 {
            return Err(TrainError::InvalidConfig("batch_size must be at least 1".to_string()));
        }
        if !(self.validation_split > 0.0 && self.validation_split < 1.0) {
            return Err(TrainError::InvalidConfig(format!(
                "validation_split must be in (0, 1), got {}",
                self.validation_split
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HybridClassifierConfig::default();
        assert_eq!(config.n_components, 20);
        assert_eq!(config.lstm_units, 64);
        assert_eq!(config.num_heads, 4);
        assert_eq!(config.ff_dim, 128);
        assert_eq!(config.dropout, 0.2);
        assert_eq!(config.seed, Seed::new(42));
        assert_eq!(config.se_ratio, 16);
        assert_eq!(config.learning_rate, 1e-3);
        assert_eq!(config.recalibration, RecalibrationMode::Fitted);

        let options = FitOptions::default();
        assert_eq!(options.epochs, 50);
        assert_eq!(options.batch_size, 32);
        assert_eq!(options.validation_split, 0.2);
        assert!(options.class_balance);
    }

    #[test]
    fn test_partial_json() {
        let config: HybridClassifierConfig =
            serde_json::from_str(r#"{ "seed": 7, "recalibration": "resampled" }"#).unwrap();
        assert_eq!(config.seed, Seed::new(7));
        assert_eq!(config.recalibration, RecalibrationMode::Resampled);
        assert_eq!(config.n_components, 20);

        let options: FitOptions = serde_json::from_str(r#"{ "epochs": 3 }"#).unwrap();
        assert_eq!(options.epochs, 3);
        assert_eq!(options.batch_size, 32);
    }

    #[test]
    fn test_json_file_round_trip() {
        let config = HybridClassifierConfig::new().with_n_components(5).with_verbose(false);
        let path = std::env::temp_dir().join(format!("tabfuse_config_{}.json", std::process::id()));
        config.save_json(&path).unwrap();
        assert_eq!(HybridClassifierConfig::from_json_file(&path).unwrap(), config);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_validation() {
        assert!(HybridClassifierConfig::default().validate().is_ok());
        assert!(HybridClassifierConfig::default().with_n_components(0).validate().is_err());
        assert!(HybridClassifierConfig::default().with_se_ratio(0).validate().is_err());
        assert!(HybridClassifierConfig::default().with_learning_rate(-1.0).validate().is_err());

        assert!(FitOptions::default().validate().is_ok());
        assert!(FitOptions::default().with_epochs(0).validate().is_err());
        assert!(FitOptions::default().with_batch_size(0).validate().is_err());
        assert!(FitOptions::default().with_validation_split(1.0).validate().is_err());
        assert!(FitOptions::default().with_validation_split(0.0).validate().is_err());
    }

    #[test]
    fn test_model_config_mirrors_fields() {
        let config = HybridClassifierConfig::default().with_n_components(6).with_lstm_units(12).with_num_heads(3);
        let model = config.model_config(4);
        assert_eq!(model.seq_len, 6);
        assert_eq!(model.n_classes, 4);
        assert_eq!(model.lstm_units, 12);
        assert_eq!(model.num_heads, 3);
        assert!(model.validate().is_ok());
    }
}
