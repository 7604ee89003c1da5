//! Per-epoch training history.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use tabfuse_analysis::{training_history_figure, Curve, Figure};

/// Metrics recorded at the end of one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    /// Epoch number, starting at 1.
    pub epoch: usize,
    /// Mean training loss over the epoch's samples.
    pub train_loss: f64,
    /// Training accuracy over the epoch's samples.
    pub train_accuracy: f64,
    /// Mean validation loss.
    pub valid_loss: f64,
    /// Validation accuracy.
    pub valid_accuracy: f64,
}

/// Ordered record of a training run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    epochs: Vec<EpochRecord>,
}

impl TrainingHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an epoch.
    pub fn push(&mut self, record: EpochRecord) {
        self.epochs.push(record);
    }

    /// All recorded epochs in order.
    pub fn epochs(&self) -> &[EpochRecord] {
        &self.epochs
    }

    /// Number of recorded epochs.
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// The final epoch.
    pub fn last(&self) -> Option<&EpochRecord> {
        self.epochs.last()
    }

    /// The epoch with the highest validation accuracy (earliest on ties).
    pub fn best_epoch(&self) -> Option<&EpochRecord> {
        self.epochs.iter().reduce(|best, e| {
            if e.valid_accuracy > best.valid_accuracy {
                e
            } else {
                best
            }
        })
    }

    /// Training loss per epoch.
    pub fn train_loss(&self) -> Vec<f64> {
        self.epochs.iter().map(|e| e.train_loss).collect()
    }

    /// Validation loss per epoch.
    pub fn valid_loss(&self) -> Vec<f64> {
        self.epochs.iter().map(|e| e.valid_loss).collect()
    }

    /// Training accuracy per epoch.
    pub fn train_accuracy(&self) -> Vec<f64> {
        self.epochs.iter().map(|e| e.train_accuracy).collect()
    }

    /// Validation accuracy per epoch.
    pub fn valid_accuracy(&self) -> Vec<f64> {
        self.epochs.iter().map(|e| e.valid_accuracy).collect()
    }

    /// Accuracy and loss panels, train against validation.
    pub fn figure(&self) -> Result<Figure> {
        let accuracy = [
            Curve::new("train", self.train_accuracy()),
            Curve::new("validation", self.valid_accuracy()),
        ];
        let loss = [
            Curve::new("train", self.train_loss()),
            Curve::new("validation", self.valid_loss()),
        ];
        Ok(training_history_figure(&accuracy, &loss)?)
    }

    /// Write the history as pretty-printed JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read a history written by [`save_json`](Self::save_json).
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(epoch: usize, valid_accuracy: f64) -> EpochRecord {
        EpochRecord {
            epoch,
            train_loss: 1.0 / epoch as f64,
            train_accuracy: 0.5,
            valid_loss: 1.5 / epoch as f64,
            valid_accuracy,
        }
    }

    #[test]
    fn test_series_and_best_epoch() {
        let mut history = TrainingHistory::new();
        assert!(history.best_epoch().is_none());
        history.push(record(1, 0.6));
        history.push(record(2, 0.8));
        history.push(record(3, 0.8));

        assert_eq!(history.len(), 3);
        assert_eq!(history.best_epoch().map(|e| e.epoch), Some(2));
        assert_eq!(history.last().map(|e| e.epoch), Some(3));
        assert_eq!(history.valid_accuracy(), vec![0.6, 0.8, 0.8]);
        assert_eq!(history.train_loss()[1], 0.5);
    }

    #[test]
    fn test_json_file_round_trip() {
        let mut history = TrainingHistory::new();
        history.push(record(1, 0.7));
        let path = std::env::temp_dir().join(format!("tabfuse_history_{}.json", std::process::id()));
        history.save_json(&path).unwrap();
        assert_eq!(TrainingHistory::load_json(&path).unwrap(), history);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_figure() {
        let mut history = TrainingHistory::new();
        history.push(record(1, 0.5));
        history.push(record(2, 0.9));
        assert!(history.figure().unwrap().as_svg().contains("<svg"));
    }
}
