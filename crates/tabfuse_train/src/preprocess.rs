//! Fitted feature and label transforms shared by training and inference.

use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::HybridClassifierConfig;
use crate::error::Result;
use tabfuse_core::ClassLabel;
use tabfuse_data::FittedLabelEncoder;
use tabfuse_transforms::{
    to_sequence, FittedPca, FittedRecalibration, FittedScaler, Pca, StandardScaler,
};

/// Everything learned from the training subset of a fit.
///
/// Applies scaling, projection and recalibration in that order, then views
/// each row as a `(n_components, 1)` pseudo-sequence. Nothing here changes
/// after fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPreprocessor<L> {
    labels: FittedLabelEncoder<L>,
    scaler: FittedScaler,
    pca: FittedPca,
    recalibration: FittedRecalibration,
}

impl<L: ClassLabel> FittedPreprocessor<L> {
    /// Fit the feature chain on the training subset.
    pub(crate) fn fit(
        labels: FittedLabelEncoder<L>,
        x_train: &Array2<f64>,
        config: &HybridClassifierConfig,
    ) -> Result<Self> {
        let scaler = StandardScaler::new().fit(x_train)?;
        let scaled = scaler.transform(x_train)?;
        let pca = Pca::new(config.n_components).fit(&scaled)?;
        let recalibration = config.recalibration().fit(config.n_components)?;

        debug!(
            features = scaler.n_features(),
            components = pca.n_components(),
            retained_variance = pca.explained_variance_ratio().sum(),
            "Fitted feature transforms"
        );

        Ok(Self {
            labels,
            scaler,
            pca,
            recalibration,
        })
    }

    /// Map raw features to model input of shape `(n, n_components, 1)`.
    ///
    /// # Errors
    ///
    /// Returns a feature-count mismatch if `x` has a different number of
    /// columns than the training data.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array3<f32>> {
        let scaled = self.scaler.transform(x)?;
        let projected = self.pca.transform(&scaled)?;
        let recalibrated = self.recalibration.transform(&projected)?;
        Ok(to_sequence(&recalibrated))
    }

    /// The fitted label encoder.
    pub fn labels(&self) -> &FittedLabelEncoder<L> {
        &self.labels
    }

    /// The fitted scaler.
    pub fn scaler(&self) -> &FittedScaler {
        &self.scaler
    }

    /// The fitted PCA.
    pub fn pca(&self) -> &FittedPca {
        &self.pca
    }

    /// The fitted recalibration weights.
    pub fn recalibration(&self) -> &FittedRecalibration {
        &self.recalibration
    }

    /// Raw feature count expected at inference.
    pub fn n_features(&self) -> usize {
        self.scaler.n_features()
    }

    /// Pseudo-sequence length.
    pub fn n_components(&self) -> usize {
        self.pca.n_components()
    }

    /// Number of fitted classes.
    pub fn n_classes(&self) -> usize {
        self.labels.n_classes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabfuse_core::Seed;
    use tabfuse_data::{synthetic::BlobsConfig, LabelEncoder};
    use tabfuse_transforms::TransformError;

    use crate::error::TrainError;

    fn fitted(n_components: usize) -> (FittedPreprocessor<usize>, Array2<f64>) {
        let (x, y) = BlobsConfig::new(40, 6, 2).with_seed(Seed::new(3)).generate().unwrap();
        let labels = LabelEncoder::new().fit(&y).unwrap();
        let config = HybridClassifierConfig::default().with_n_components(n_components);
        (FittedPreprocessor::fit(labels, &x, &config).unwrap(), x)
    }

    #[test]
    fn test_transform_shape() {
        let (pre, x) = fitted(4);
        assert_eq!(pre.transform(&x).unwrap().dim(), (40, 4, 1));
        assert_eq!(pre.n_features(), 6);
        assert_eq!(pre.n_components(), 4);
        assert_eq!(pre.n_classes(), 2);
    }

    #[test]
    fn test_transform_is_repeatable() {
        let (pre, x) = fitted(3);
        let snapshot = pre.clone();
        assert_eq!(pre.transform(&x).unwrap(), pre.transform(&x).unwrap());
        assert_eq!(pre, snapshot);
    }

    #[test]
    fn test_too_many_components() {
        let (x, y) = BlobsConfig::new(30, 5, 2).generate().unwrap();
        let labels = LabelEncoder::new().fit(&y).unwrap();
        let config = HybridClassifierConfig::default().with_n_components(8);
        assert!(matches!(
            FittedPreprocessor::fit(labels, &x, &config),
            Err(TrainError::TransformError(TransformError::TooManyComponents { requested: 8, max: 5 }))
        ));
    }

    #[test]
    fn test_feature_mismatch() {
        let (pre, _) = fitted(2);
        assert!(matches!(
            pre.transform(&Array2::zeros((3, 7))),
            Err(TrainError::TransformError(TransformError::FeatureMismatch { expected: 6, got: 7 }))
        ));
    }
}
