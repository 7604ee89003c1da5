//! # tabfuse
//!
//! Tabular classification with a hybrid recurrent/attention network.
//!
//! Each row of a feature matrix is standardized, projected with PCA and
//! reweighted per component, then read as a short pseudo-sequence by a
//! network that stacks:
//!
//! - **Encoder**: an LSTM over the components
//! - **Self-attention**: a transformer block
//! - **Fusion**: additive attention over encoder and attention outputs
//! - **Decoder**: a second LSTM whose final state feeds a dense head
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tabfuse::prelude::*;
//!
//! let x = read_features_npy("data/X.npy")?;
//! let y = read_labels_npy("data/y.npy")?;
//!
//! let mut clf = HybridClassifier::new(HybridClassifierConfig::default());
//! clf.fit(&x, &y, &FitOptions::default().with_epochs(30))?;
//!
//! let eval = clf.evaluate(&x, &y)?;
//! println!("{}", eval.report.to_string_table());
//! clf.plot_training_history()?.save("history.svg")?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export all crates
pub use tabfuse_analysis as analysis;
pub use tabfuse_core as core;
pub use tabfuse_data as data;
pub use tabfuse_models as models;
pub use tabfuse_train as train;
pub use tabfuse_transforms as transforms;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use tabfuse::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use tabfuse_core::{ClassLabel, Seed, Split};

    // Data
    pub use tabfuse_data::{
        read_features_npy, read_labels_npy, synthetic::BlobsConfig, train_test_split,
        write_features_npy, write_labels_npy, LabelEncoder, RandomOverSampler,
    };

    // Transforms
    pub use tabfuse_transforms::{Pca, RecalibrationMode, StandardScaler};

    // Models
    pub use tabfuse_models::{HybridSequenceModel, HybridSequenceModelConfig, ModelStage};

    // Training
    pub use tabfuse_train::{
        Evaluation, FitOptions, HybridClassifier, HybridClassifierConfig, TrainError,
        TrainingHistory,
    };

    // Analysis
    pub use tabfuse_analysis::{
        classification_report, confusion_matrix, ClassificationReport, ConfusionMatrix, Figure,
    };
}
