//! Standardization applied before every model

use super::{check_width, FeatureMatrix, FeatureTransform};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// `(x - mean) / scale`, column by column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self { mean, scale }
    }

    /// Checks the scaler was fitted on `n_features` columns
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.mean.len() != self.scale.len() {
            return Err(format!(
                "mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if self.mean.len() != n_features {
            return Err(format!(
                "scaler covers {} features, expected {}",
                self.mean.len(),
                n_features
            ));
        }
        Ok(())
    }
}

impl FeatureTransform for StandardScaler {
    fn transform(&self, input: &FeatureMatrix) -> Result<FeatureMatrix> {
        check_width(input, self.mean.len())?;
        let mut out = input.clone();
        for mut row in out.rows_mut() {
            for ((x, mean), scale) in row.iter_mut().zip(&self.mean).zip(&self.scale) {
                // Constant columns were fitted with zero variance
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                *x = (*x - mean) / scale;
            }
        }
        Ok(out)
    }
}
