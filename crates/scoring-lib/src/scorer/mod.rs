//! Model families behind a uniform scoring interface
//!
//! Every loaded artifact becomes a [`Scorer`]; the optional feature scaler
//! becomes a [`FeatureTransform`]. Both operate on a [`FeatureMatrix`] with
//! one row per sample.

mod boosting;
mod forest;
mod linear;
mod onnx;
mod scaler;
mod tree;

pub use boosting::GradientBoostingClassifier;
pub use forest::RandomForestClassifier;
pub use linear::LogisticRegression;
pub use onnx::OnnxScorer;
pub use scaler::StandardScaler;
pub use tree::{DecisionTree, TreeNode};

use anyhow::{Context, Result};
use ndarray::Array2;

/// Row-major feature matrix
pub type FeatureMatrix = Array2<f64>;

/// A trained classifier
pub trait Scorer: Send + Sync {
    /// Predicted class label for every row
    fn predict(&self, input: &FeatureMatrix) -> Result<Vec<f64>>;

    /// Per-class probabilities for every row.
    ///
    /// Returns `Ok(None)` when the model has no probability estimate.
    fn predict_proba(&self, input: &FeatureMatrix) -> Result<Option<Vec<Vec<f64>>>>;

    /// Labels and probabilities together.
    ///
    /// Scorers that get both from one evaluation override this.
    fn predict_with_proba(
        &self,
        input: &FeatureMatrix,
    ) -> Result<(Vec<f64>, Option<Vec<Vec<f64>>>)> {
        let labels = self.predict(input)?;
        let proba = self
            .predict_proba(input)
            .context("probability estimate failed")?;
        Ok((labels, proba))
    }
}

/// A feature transformation applied before every model
pub trait FeatureTransform: Send + Sync {
    fn transform(&self, input: &FeatureMatrix) -> Result<FeatureMatrix>;
}

pub(crate) fn default_classes() -> Vec<f64> {
    vec![0.0, 1.0]
}

pub(crate) fn check_width(input: &FeatureMatrix, expected: usize) -> Result<()> {
    if input.ncols() != expected {
        anyhow::bail!(
            "shape mismatch: model expects {} features, got {}",
            expected,
            input.ncols()
        );
    }
    Ok(())
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Label for a binary classifier: the positive class wins only above 0.5
pub(crate) fn binary_label(classes: &[f64], positive: f64) -> f64 {
    if positive > 0.5 {
        classes[1]
    } else {
        classes[0]
    }
}

pub(crate) fn validate_binary_classes(classes: &[f64]) -> std::result::Result<(), String> {
    if classes.len() != 2 {
        return Err(format!(
            "binary classifier needs 2 classes, got {}",
            classes.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sigmoid_midpoint_and_saturation() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(40.0) > 0.999_999);
        assert!(sigmoid(-40.0) < 1e-6);
    }

    #[test]
    fn test_binary_label_ties_go_to_negative_class() {
        let classes = default_classes();
        assert_eq!(binary_label(&classes, 0.5), 0.0);
        assert_eq!(binary_label(&classes, 0.51), 1.0);
    }

    #[test]
    fn test_check_width_reports_shape() {
        let input = array![[1.0, 2.0, 3.0]];
        assert!(check_width(&input, 3).is_ok());
        let err = check_width(&input, 6).unwrap_err();
        assert!(err.to_string().contains("shape mismatch"));
    }
}
