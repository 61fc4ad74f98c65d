//! Logistic regression scorer

use super::{
    binary_label, check_width, default_classes, sigmoid, validate_binary_classes,
    FeatureMatrix, Scorer,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Binary logistic regression: `p = sigmoid(w·x + b)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub n_features: usize,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_classes")]
    pub classes: Vec<f64>,
}

impl LogisticRegression {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            n_features: coefficients.len(),
            coefficients,
            intercept,
            classes: default_classes(),
        }
    }

    /// Check that the decoded artifact is internally consistent
    pub fn validate(&self) -> Result<(), String> {
        if self.coefficients.len() != self.n_features {
            return Err(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.n_features
            ));
        }
        validate_binary_classes(&self.classes)
    }

    fn positive_probabilities(&self, input: &FeatureMatrix) -> Result<Vec<f64>> {
        check_width(input, self.n_features)?;
        Ok(input
            .rows()
            .into_iter()
            .map(|row| {
                let z: f64 = row
                    .iter()
                    .zip(&self.coefficients)
                    .map(|(x, w)| x * w)
                    .sum::<f64>()
                    + self.intercept;
                sigmoid(z)
            })
            .collect())
    }
}

impl Scorer for LogisticRegression {
    fn predict(&self, input: &FeatureMatrix) -> Result<Vec<f64>> {
        Ok(self
            .positive_probabilities(input)?
            .into_iter()
            .map(|p| binary_label(&self.classes, p))
            .collect())
    }

    fn predict_proba(&self, input: &FeatureMatrix) -> Result<Option<Vec<Vec<f64>>>> {
        let rows = self
            .positive_probabilities(input)?
            .into_iter()
            .map(|p| vec![1.0 - p, p])
            .collect();
        Ok(Some(rows))
    }
}
