//! Confusion matrix over a fixed set of classes.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Confusion matrix for classification evaluation.
///
/// Rows are true classes and columns are predicted classes, both indexed by
/// encoded class index. Every class of the fitted label set has a row and a
/// column, including classes absent from a particular evaluation set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// The matrix values (row = true, col = pred).
    pub matrix: Vec<Vec<usize>>,
    /// Number of classes.
    pub n_classes: usize,
    /// Class names, one per index.
    pub labels: Option<Vec<String>>,
}

impl ConfusionMatrix {
    /// Create an all-zero matrix over `n_classes` classes.
    pub fn new(n_classes: usize) -> Self {
        Self {
            matrix: vec![vec![0; n_classes]; n_classes],
            n_classes,
            labels: None,
        }
    }

    /// Attach class names.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] unless there is exactly one
    /// name per class.
    pub fn with_labels(mut self, labels: Vec<String>) -> Result<Self> {
        if labels.len() != self.n_classes {
            return Err(AnalysisError::InvalidInput(format!(
                "{} class names for {} classes",
                labels.len(),
                self.n_classes
            )));
        }
        self.labels = Some(labels);
        Ok(self)
    }

    /// Record one prediction.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] if either index is not a class.
    pub fn add(&mut self, true_class: usize, pred_class: usize) -> Result<()> {
        if true_class >= self.n_classes || pred_class >= self.n_classes {
            return Err(AnalysisError::InvalidInput(format!(
                "class pair ({true_class}, {pred_class}) outside 0..{}",
                self.n_classes
            )));
        }
        self.matrix[true_class][pred_class] += 1;
        Ok(())
    }

    /// Display name of a class: its label if set, else its index.
    pub fn label(&self, class: usize) -> String {
        self.labels
            .as_ref()
            .and_then(|l| l.get(class).cloned())
            .unwrap_or_else(|| class.to_string())
    }

    /// Total number of recorded predictions.
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Number of samples whose true class is `class`.
    pub fn support(&self, class: usize) -> usize {
        self.matrix[class].iter().sum()
    }

    /// Number of samples predicted as `class`.
    pub fn predicted(&self, class: usize) -> usize {
        self.matrix.iter().map(|row| row[class]).sum()
    }

    /// Largest single cell.
    pub fn max_count(&self) -> usize {
        self.matrix.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Whether every off-diagonal cell is zero.
    pub fn is_diagonal(&self) -> bool {
        self.matrix
            .iter()
            .enumerate()
            .all(|(i, row)| row.iter().enumerate().all(|(j, &v)| i == j || v == 0))
    }

    /// Fraction of predictions on the diagonal.
    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.n_classes).map(|i| self.matrix[i][i]).sum();
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    /// Precision for a class; 0 when nothing was predicted as it.
    pub fn precision(&self, class: usize) -> f64 {
        let tp = self.matrix[class][class];
        let predicted = self.predicted(class);
        if predicted == 0 {
            0.0
        } else {
            tp as f64 / predicted as f64
        }
    }

    /// Recall for a class; 0 when the class has no support.
    pub fn recall(&self, class: usize) -> f64 {
        let tp = self.matrix[class][class];
        let support = self.support(class);
        if support == 0 {
            0.0
        } else {
            tp as f64 / support as f64
        }
    }

    /// F1 score for a class.
    pub fn f1(&self, class: usize) -> f64 {
        let p = self.precision(class);
        let r = self.recall(class);
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Row-normalized matrix (each row shows recall per predicted class).
    pub fn normalize(&self) -> Vec<Vec<f64>> {
        self.matrix
            .iter()
            .map(|row| {
                let sum: usize = row.iter().sum();
                if sum == 0 {
                    vec![0.0; self.n_classes]
                } else {
                    row.iter().map(|&v| v as f64 / sum as f64).collect()
                }
            })
            .collect()
    }

    /// Plain-text table with true classes down and predictions across.
    pub fn to_string_table(&self) -> String {
        let mut s = String::new();

        s.push_str("       ");
        for j in 0..self.n_classes {
            s.push_str(&format!("{:>8}", self.label(j).chars().take(7).collect::<String>()));
        }
        s.push('\n');

        for i in 0..self.n_classes {
            s.push_str(&format!("{:>6} ", self.label(i).chars().take(6).collect::<String>()));
            for j in 0..self.n_classes {
                s.push_str(&format!("{:>8}", self.matrix[i][j]));
            }
            s.push('\n');
        }

        s
    }
}

/// Compute a confusion matrix from predicted and true class indices.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidInput`] if the slices differ in length
/// or contain an index outside `0..n_classes`.
pub fn confusion_matrix(preds: &[usize], targets: &[usize], n_classes: usize) -> Result<ConfusionMatrix> {
    if preds.len() != targets.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "{} predictions for {} targets",
            preds.len(),
            targets.len()
        )));
    }
    let mut cm = ConfusionMatrix::new(n_classes);
    for (&pred, &target) in preds.iter().zip(targets) {
        cm.add(target, pred)?;
    }
    Ok(cm)
}
