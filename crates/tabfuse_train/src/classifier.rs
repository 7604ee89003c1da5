//! sklearn-like pipeline facade over the hybrid sequence model.
//!
//! [`HybridClassifier`] owns every fitted piece of the pipeline: the
//! feature transforms, the label encoder, the network and the history of
//! the last fit. It accepts raw tabular features and arbitrary labels and
//! hides the Burn backends behind plain `ndarray` inputs and outputs.

use burn::module::AutodiffModule;
use burn::prelude::*;
use burn_autodiff::Autodiff;
use burn_ndarray::NdArray;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{FitOptions, HybridClassifierConfig};
use crate::error::{Result, TrainError};
use crate::history::TrainingHistory;
use crate::preprocess::FittedPreprocessor;
use crate::training::ClassificationTrainer;
use tabfuse_analysis::{
    classification_report, confusion_matrix, confusion_matrix_figure, ClassificationReport,
    ConfusionMatrix, Figure,
};
use tabfuse_core::{matrix_from_tensor, sequence_to_tensor, ClassLabel, ClassificationModel, CoreError, Split};
use tabfuse_data::{
    train_test_split, DataError, LabelEncoder, RandomOverSampler, SequenceDataset, SequenceLoader,
};
use tabfuse_models::{HybridSequenceModel, ModelStage};

/// Type alias for the training backend (CPU with autodiff).
type TrainBackend = Autodiff<NdArray>;

/// Type alias for the inference backend (CPU only).
type InferBackend = NdArray;

/// Rows per forward pass at inference.
const PREDICT_CHUNK: usize = 1024;

/// The network in both of its forms.
///
/// The autodiff copy carries on training in later fits; the inference copy
/// serves `predict`.
#[derive(Debug)]
struct TrainedNetwork {
    train: HybridSequenceModel<TrainBackend>,
    infer: HybridSequenceModel<InferBackend>,
}

/// Metrics of a fitted classifier on a labelled set.
///
/// The confusion matrix and the report cover every fitted class in
/// encoded order; report rows are named by the decoded labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Fraction of correct predictions.
    pub accuracy: f64,
    /// Counts with true classes as rows and predictions as columns.
    pub confusion_matrix: ConfusionMatrix,
    /// Per-class precision, recall, F1 and support.
    pub report: ClassificationReport,
}

/// Tabular classifier: standardize, oversample, project, recalibrate and
/// classify with a recurrent/attention network.
///
/// # Example
///
/// ```rust,ignore
/// use tabfuse_train::{FitOptions, HybridClassifier, HybridClassifierConfig};
///
/// let mut clf = HybridClassifier::new(HybridClassifierConfig::default());
/// clf.fit(&x_train, &y_train, &FitOptions::default())?;
///
/// let labels = clf.predict(&x_test)?;
/// let eval = clf.evaluate(&x_test, &y_test)?;
/// println!("{}", eval.report.to_string_table());
/// clf.plot_training_history()?.save("history.svg")?;
/// ```
#[derive(Debug)]
pub struct HybridClassifier<L: ClassLabel> {
    config: HybridClassifierConfig,
    preprocessor: Option<FittedPreprocessor<L>>,
    network: Option<TrainedNetwork>,
    history: TrainingHistory,
    device: <TrainBackend as Backend>::Device,
}

impl<L: ClassLabel> HybridClassifier<L> {
    /// Create an unfitted classifier.
    pub fn new(config: HybridClassifierConfig) -> Self {
        Self {
            config,
            preprocessor: None,
            network: None,
            history: TrainingHistory::new(),
            device: Default::default(),
        }
    }

    /// The classifier configuration.
    pub fn config(&self) -> &HybridClassifierConfig {
        &self.config
    }

    /// Fit the pipeline on features `x` and labels `y`.
    ///
    /// Labels are encoded, optionally oversampled, and split into training
    /// and validation subsets. Scaling and PCA are fitted on the training
    /// subset only. The network is created on the first call and trained
    /// further on later calls. The history is replaced with this run's.
    ///
    /// Everything is validated and preprocessed before any state changes;
    /// on error the classifier is left as it was.
    ///
    /// # Errors
    ///
    /// - [`TrainError::InvalidConfig`] for invalid config or options
    /// - [`DataError::EmptyData`] / [`DataError::InvalidShape`] for bad inputs
    /// - [`DataError::SingleClass`] when balancing a single class
    /// - `TooManyComponents` when `n_components` exceeds the training data
    /// - [`TrainError::ClassCountMismatch`] when refitting with a different
    ///   number of classes
    pub fn fit(&mut self, x: &Array2<f64>, y: &[L], options: &FitOptions) -> Result<&mut Self> {
        self.config.validate()?;
        options.validate()?;
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(DataError::EmptyData.into());
        }
        if x.nrows() != y.len() {
            return Err(DataError::InvalidShape(format!(
                "x has {} samples but y has {} labels",
                x.nrows(),
                y.len()
            ))
            .into());
        }

        let seed = self.config.seed;
        let labels = LabelEncoder::new().fit(y)?;
        let n_classes = labels.n_classes();
        if let Some(network) = &self.network {
            if network.train.n_classes() != n_classes {
                return Err(TrainError::ClassCountMismatch {
                    expected: network.train.n_classes(),
                    got: n_classes,
                });
            }
        }
        let model_config = self.config.model_config(n_classes);
        model_config.validate()?;

        info!(
            samples = x.nrows(),
            features = x.ncols(),
            classes = n_classes,
            "Fitting hybrid classifier"
        );
        let encoded = labels.transform(y)?;

        let (x_all, y_all) = if options.class_balance {
            let (x_bal, y_bal) = RandomOverSampler::new(seed.derive("balance")).fit_resample(x, &encoded)?;
            info!(before = x.nrows(), after = x_bal.nrows(), "Oversampled minority classes");
            (x_bal, y_bal)
        } else {
            (x.clone(), encoded)
        };

        let split = train_test_split(&x_all, &y_all, options.validation_split, seed.derive("split"))?;
        debug!(
            train = split.y_train.len(),
            valid = split.y_test.len(),
            "Split train/validation"
        );

        let preprocessor = FittedPreprocessor::fit(labels, &split.x_train, &self.config)?;
        let x_train = preprocessor.transform(&split.x_train)?;
        let x_valid = preprocessor.transform(&split.x_test)?;

        let train_loader = SequenceLoader::builder(SequenceDataset::from_arrays(x_train, split.y_train, n_classes)?)
            .batch_size(options.batch_size)
            .seed(seed.derive("shuffle"))
            .split(Split::Train)
            .build()?;
        let valid_loader = SequenceLoader::builder(SequenceDataset::from_arrays(x_valid, split.y_test, n_classes)?)
            .batch_size(options.batch_size)
            .split(Split::Valid)
            .build()?;

        let model = match &self.network {
            Some(network) => network.train.clone(),
            None => {
                <TrainBackend as Backend>::seed(seed.derive("weights").value());
                model_config.init::<TrainBackend>(&self.device)?
            }
        };

        let trainer = ClassificationTrainer::<TrainBackend>::new(
            self.config.trainer_config(options.epochs),
            self.device.clone(),
        );
        let output = trainer.fit(model, &train_loader, &valid_loader)?;

        let infer = output.model.valid();
        self.network = Some(TrainedNetwork {
            train: output.model,
            infer,
        });
        self.preprocessor = Some(preprocessor);
        self.history = output.history;
        Ok(self)
    }

    fn fitted(&self) -> Result<(&FittedPreprocessor<L>, &TrainedNetwork)> {
        match (&self.preprocessor, &self.network) {
            (Some(preprocessor), Some(network)) => Ok((preprocessor, network)),
            _ => Err(TrainError::NotFitted),
        }
    }

    /// Class probabilities of shape `(n, n_classes)`, columns in the order
    /// of [`classes`](Self::classes).
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::NotFitted`] before a successful fit, and a
    /// feature-count mismatch if `x` differs from the training width.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f32>> {
        let (preprocessor, network) = self.fitted()?;
        if x.nrows() == 0 {
            return Err(DataError::EmptyData.into());
        }

        let seq = preprocessor.transform(x)?;
        let mut chunks = Vec::with_capacity(seq.len_of(Axis(0)).div_ceil(PREDICT_CHUNK));
        for chunk in seq.axis_chunks_iter(Axis(0), PREDICT_CHUNK) {
            let input = sequence_to_tensor::<InferBackend>(&chunk.to_owned(), &self.device);
            chunks.push(matrix_from_tensor(network.infer.forward_probs(input))?);
        }

        let views: Vec<_> = chunks.iter().map(|c| c.view()).collect();
        ndarray::concatenate(Axis(0), &views)
            .map_err(|e| TrainError::from(CoreError::ShapeMismatch(e.to_string())))
    }

    /// Predicted labels, one per row of `x`.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::NotFitted`] before a successful fit.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<L>> {
        let (preprocessor, _) = self.fitted()?;
        let indices = argmax_rows(&self.predict_proba(x)?);
        Ok(preprocessor.labels().inverse_transform(&indices)?)
    }

    /// Accuracy, confusion matrix and classification report on `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::NotFitted`] before a successful fit and
    /// [`DataError::UnseenLabel`] if `y` holds a label not seen in training.
    pub fn evaluate(&self, x: &Array2<f64>, y: &[L]) -> Result<Evaluation> {
        let (preprocessor, _) = self.fitted()?;
        if x.nrows() != y.len() {
            return Err(DataError::InvalidShape(format!(
                "x has {} samples but y has {} labels",
                x.nrows(),
                y.len()
            ))
            .into());
        }

        let targets = preprocessor.labels().transform(y)?;
        let preds = argmax_rows(&self.predict_proba(x)?);
        let names = preprocessor
            .labels()
            .classes()
            .iter()
            .map(ToString::to_string)
            .collect();

        let cm = confusion_matrix(&preds, &targets, preprocessor.n_classes())?.with_labels(names)?;
        let report = classification_report(&cm);
        info!(accuracy = cm.accuracy(), samples = y.len(), "Evaluated classifier");

        Ok(Evaluation {
            accuracy: cm.accuracy(),
            confusion_matrix: cm,
            report,
        })
    }

    /// Accuracy and loss curves of the last fit.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::NotFitted`] before a successful fit.
    pub fn plot_training_history(&self) -> Result<Figure> {
        self.fitted()?;
        self.history.figure()
    }

    /// Confusion-matrix heat map on `(x, y)`.
    ///
    /// # Errors
    ///
    /// Same as [`evaluate`](Self::evaluate).
    pub fn plot_confusion_matrix(&self, x: &Array2<f64>, y: &[L]) -> Result<Figure> {
        let evaluation = self.evaluate(x, y)?;
        Ok(confusion_matrix_figure(&evaluation.confusion_matrix)?)
    }

    /// History of the last fit; empty before the first.
    pub fn history(&self) -> &TrainingHistory {
        &self.history
    }

    /// Whether a fit has completed.
    pub fn is_fitted(&self) -> bool {
        self.fitted().is_ok()
    }

    /// Fitted classes in encoded order.
    pub fn classes(&self) -> Option<&[L]> {
        self.preprocessor.as_ref().map(|p| p.labels().classes())
    }

    /// Fitted transforms, for inspection.
    pub fn fitted_preprocessor(&self) -> Option<&FittedPreprocessor<L>> {
        self.preprocessor.as_ref()
    }

    /// Stage shapes of the trained network.
    pub fn model_stages(&self) -> Option<Vec<ModelStage>> {
        self.network.as_ref().map(|n| n.infer.stages())
    }
}

/// Index of the largest value in each row.
fn argmax_rows(probs: &Array2<f32>) -> Vec<usize> {
    probs
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |(best, max), (i, &v)| {
                    if v > max {
                        (i, v)
                    } else {
                        (best, max)
                    }
                })
                .0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tabfuse_core::Seed;
    use tabfuse_data::synthetic::BlobsConfig;
    use tabfuse_transforms::TransformError;

    fn small_config() -> HybridClassifierConfig {
        HybridClassifierConfig::default()
            .with_n_components(3)
            .with_lstm_units(8)
            .with_num_heads(2)
            .with_ff_dim(16)
            .with_attention_dim(4)
            .with_head_units(8)
            .with_verbose(false)
    }

    fn quick() -> FitOptions {
        FitOptions::default().with_epochs(2).with_batch_size(16)
    }

    fn blobs(n: usize) -> (Array2<f64>, Vec<String>) {
        let (x, y) = BlobsConfig::new(n, 5, 2)
            .with_separation(6.0)
            .with_seed(Seed::new(11))
            .generate()
            .unwrap();
        let y = y.into_iter().map(|c| if c == 0 { "neg" } else { "pos" }.to_string()).collect();
        (x, y)
    }

    #[test]
    fn test_not_fitted() {
        let clf = HybridClassifier::<String>::new(small_config());
        let x = Array2::zeros((2, 5));
        assert!(!clf.is_fitted());
        assert!(clf.classes().is_none());
        assert!(matches!(clf.predict(&x), Err(TrainError::NotFitted)));
        assert!(matches!(clf.predict_proba(&x), Err(TrainError::NotFitted)));
        assert!(matches!(
            clf.evaluate(&x, &["a".to_string(), "b".to_string()]),
            Err(TrainError::NotFitted)
        ));
        assert!(matches!(clf.plot_training_history(), Err(TrainError::NotFitted)));
    }

    #[test]
    fn test_fit_predict() {
        let (x, y) = blobs(60);
        let mut clf = HybridClassifier::new(small_config());
        clf.fit(&x, &y, &quick()).unwrap();

        assert!(clf.is_fitted());
        assert_eq!(clf.history().len(), 2);
        assert_eq!(clf.classes().unwrap(), &["neg".to_string(), "pos".to_string()]);

        let preds = clf.predict(&x).unwrap();
        assert_eq!(preds.len(), 60);
        assert!(preds.iter().all(|p| p == "neg" || p == "pos"));

        let probs = clf.predict_proba(&x).unwrap();
        assert_eq!(probs.dim(), (60, 2));
        for row in probs.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_failed_fit_leaves_state_untouched() {
        let (x, y) = blobs(40);
        let mut clf = HybridClassifier::new(small_config().with_n_components(9));
        assert!(matches!(
            clf.fit(&x, &y, &quick()),
            Err(TrainError::TransformError(TransformError::TooManyComponents { .. }))
        ));
        assert!(!clf.is_fitted());
        assert!(clf.history().is_empty());
    }

    #[test]
    fn test_refit_with_other_class_count() {
        let (x, y) = blobs(40);
        let mut clf = HybridClassifier::new(small_config());
        clf.fit(&x, &y, &quick()).unwrap();
        let before = clf.predict(&x).unwrap();

        let three: Vec<String> = (0..40).map(|i| format!("c{}", i % 3)).collect();
        assert!(matches!(
            clf.fit(&x, &three, &quick()),
            Err(TrainError::ClassCountMismatch { expected: 2, got: 3 })
        ));
        assert_eq!(clf.predict(&x).unwrap(), before);
    }

    #[test]
    fn test_mismatched_lengths() {
        let mut clf = HybridClassifier::new(small_config());
        let x = Array2::zeros((4, 5));
        let y = vec![1, 2, 3];
        assert!(matches!(
            clf.fit(&x, &y, &quick()),
            Err(TrainError::DataError(DataError::InvalidShape(_)))
        ));
    }

    #[test]
    fn test_evaluate_rejects_unseen_label() {
        let (x, y) = blobs(40);
        let mut clf = HybridClassifier::new(small_config());
        clf.fit(&x, &y, &quick()).unwrap();

        let x_eval = x.select(Axis(0), &[0, 1]);
        let y_eval = vec!["neg".to_string(), "other".to_string()];
        assert!(matches!(
            clf.evaluate(&x_eval, &y_eval),
            Err(TrainError::DataError(DataError::UnseenLabel(_)))
        ));
    }

    #[test]
    fn test_argmax_rows() {
        let probs = array![[0.1f32, 0.7, 0.2], [0.6, 0.3, 0.1]];
        assert_eq!(argmax_rows(&probs), vec![1, 0]);
    }
}
