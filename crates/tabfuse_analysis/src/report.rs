//! Classification report with per-class metrics.
//!
//! Per-class precision, recall, F1 and support, along with accuracy and
//! macro and weighted averages. The report is derived from a
//! [`ConfusionMatrix`], so both always describe the same class domain.

use serde::{Deserialize, Serialize};

use crate::confusion::ConfusionMatrix;

/// Per-class classification metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    /// Encoded class index.
    pub class: usize,
    /// Class name (the decoded label, or the index as text).
    pub name: String,
    /// Precision: TP / (TP + FP)
    pub precision: f64,
    /// Recall: TP / (TP + FN)
    pub recall: f64,
    /// F1-Score: 2 * (precision * recall) / (precision + recall)
    pub f1_score: f64,
    /// Support: number of true instances of this class
    pub support: usize,
}

/// Classification report with per-class and aggregate metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Per-class metrics, in encoded class order.
    pub classes: Vec<ClassMetrics>,
    /// Overall accuracy.
    pub accuracy: f64,
    /// Macro-averaged precision (unweighted mean of per-class precision).
    pub macro_precision: f64,
    /// Macro-averaged recall.
    pub macro_recall: f64,
    /// Macro-averaged F1.
    pub macro_f1: f64,
    /// Weighted-averaged precision (weighted by support).
    pub weighted_precision: f64,
    /// Weighted-averaged recall.
    pub weighted_recall: f64,
    /// Weighted-averaged F1.
    pub weighted_f1: f64,
    /// Total number of samples.
    pub total_samples: usize,
}

impl ClassificationReport {
    /// Display the report as a formatted string.
    pub fn to_string_table(&self) -> String {
        let width = self
            .classes
            .iter()
            .map(|c| c.name.chars().count())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);

        let mut output = String::new();
        output.push_str(&format!(
            "{:>width$} {:>9} {:>9} {:>9} {:>9}\n\n",
            "", "precision", "recall", "f1-score", "support"
        ));

        for class in &self.classes {
            output.push_str(&format!(
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
                class.name, class.precision, class.recall, class.f1_score, class.support
            ));
        }

        output.push('\n');
        output.push_str(&format!(
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}\n",
            "accuracy", "", "", self.accuracy, self.total_samples
        ));
        output.push_str(&format!(
            "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
            "macro avg", self.macro_precision, self.macro_recall, self.macro_f1, self.total_samples
        ));
        output.push_str(&format!(
            "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
            "weighted avg",
            self.weighted_precision,
            self.weighted_recall,
            self.weighted_f1,
            self.total_samples
        ));

        output
    }
}

/// Compute a classification report from a confusion matrix.
///
/// Every class of the matrix gets a row. Macro averages run over the
/// classes that occur among either the true or the predicted labels;
/// weighted averages are weighted by support.
///
/// # Example
///
/// ```rust
/// use tabfuse_analysis::{classification_report, confusion_matrix};
///
/// let cm = confusion_matrix(&[0, 1, 2, 0, 1, 2], &[0, 1, 1, 0, 2, 2], 3).unwrap();
/// let report = classification_report(&cm);
/// assert_eq!(report.classes.len(), 3);
/// println!("{}", report.to_string_table());
/// ```
pub fn classification_report(cm: &ConfusionMatrix) -> ClassificationReport {
    let classes: Vec<ClassMetrics> = (0..cm.n_classes)
        .map(|class| ClassMetrics {
            class,
            name: cm.label(class),
            precision: cm.precision(class),
            recall: cm.recall(class),
            f1_score: cm.f1(class),
            support: cm.support(class),
        })
        .collect();

    let observed: Vec<&ClassMetrics> = classes
        .iter()
        .filter(|c| c.support > 0 || cm.predicted(c.class) > 0)
        .collect();
    let macro_avg = |metric: fn(&ClassMetrics) -> f64| {
        if observed.is_empty() {
            0.0
        } else {
            observed.iter().map(|c| metric(c)).sum::<f64>() / observed.len() as f64
        }
    };

    let total = cm.total();
    let weighted_avg = |metric: fn(&ClassMetrics) -> f64| {
        if total == 0 {
            0.0
        } else {
            classes.iter().map(|c| metric(c) * c.support as f64).sum::<f64>() / total as f64
        }
    };

    ClassificationReport {
        accuracy: cm.accuracy(),
        macro_precision: macro_avg(|c| c.precision),
        macro_recall: macro_avg(|c| c.recall),
        macro_f1: macro_avg(|c| c.f1_score),
        weighted_precision: weighted_avg(|c| c.precision),
        weighted_recall: weighted_avg(|c| c.recall),
        weighted_f1: weighted_avg(|c| c.f1_score),
        total_samples: total,
        classes,
    }
}
