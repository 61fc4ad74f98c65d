//! Random forest scorer

use super::{check_width, default_classes, DecisionTree, FeatureMatrix, Scorer};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Bagged decision trees; leaves hold per-class weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    pub n_features: usize,
    #[serde(default = "default_classes")]
    pub classes: Vec<f64>,
    pub trees: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    pub fn new(n_features: usize, trees: Vec<DecisionTree>) -> Self {
        Self {
            n_features,
            classes: default_classes(),
            trees,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        if self.classes.is_empty() {
            return Err("forest has no classes".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.classes.len())
                .map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }

    fn probabilities(&self, input: &FeatureMatrix) -> Result<Vec<Vec<f64>>> {
        check_width(input, self.n_features)?;
        let n_classes = self.classes.len();

        input
            .rows()
            .into_iter()
            .map(|row| -> Result<Vec<f64>> {
                let mut acc = vec![0.0; n_classes];
                for tree in &self.trees {
                    let leaf = tree.leaf(row)?;
                    let total: f64 = leaf.iter().sum();
                    // An all-zero leaf contributes nothing rather than NaN
                    if total > 0.0 {
                        for (a, w) in acc.iter_mut().zip(leaf) {
                            *a += w / total;
                        }
                    }
                }
                let n_trees = self.trees.len() as f64;
                Ok(acc.into_iter().map(|a| a / n_trees).collect())
            })
            .collect()
    }
}

impl Scorer for RandomForestClassifier {
    fn predict(&self, input: &FeatureMatrix) -> Result<Vec<f64>> {
        let rows = self.probabilities(input)?;
        Ok(rows
            .iter()
            .map(|probs| {
                // First maximum wins
                let mut best = 0;
                for (i, p) in probs.iter().enumerate() {
                    if *p > probs[best] {
                        best = i;
                    }
                }
                self.classes[best]
            })
            .collect())
    }

    fn predict_proba(&self, input: &FeatureMatrix) -> Result<Option<Vec<Vec<f64>>>> {
        self.probabilities(input).map(Some)
    }
}
