//! Gradient boosted trees scorer

use super::{
    binary_label, check_width, default_classes, sigmoid, validate_binary_classes, DecisionTree,
    FeatureMatrix, Scorer,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Additive ensemble of regression trees on the log-odds scale:
/// `raw = init_score + learning_rate * Σ leaf`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingClassifier {
    pub n_features: usize,
    pub init_score: f64,
    pub learning_rate: f64,
    #[serde(default = "default_classes")]
    pub classes: Vec<f64>,
    pub trees: Vec<DecisionTree>,
}

impl GradientBoostingClassifier {
    pub fn new(n_features: usize, init_score: f64, learning_rate: f64, trees: Vec<DecisionTree>) -> Self {
        Self {
            n_features,
            init_score,
            learning_rate,
            classes: default_classes(),
            trees,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_binary_classes(&self.classes)?;
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(format!("invalid learning rate {}", self.learning_rate));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, 1)
                .map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }

    /// Raw log-odds for every row
    pub fn decision_function(&self, input: &FeatureMatrix) -> Result<Vec<f64>> {
        check_width(input, self.n_features)?;
        input
            .rows()
            .into_iter()
            .map(|row| -> Result<f64> {
                let mut sum = 0.0;
                for tree in &self.trees {
                    sum += tree.leaf(row)?[0];
                }
                Ok(self.init_score + self.learning_rate * sum)
            })
            .collect()
    }
}

impl Scorer for GradientBoostingClassifier {
    fn predict(&self, input: &FeatureMatrix) -> Result<Vec<f64>> {
        Ok(self
            .decision_function(input)?
            .into_iter()
            .map(|raw| binary_label(&self.classes, sigmoid(raw)))
            .collect())
    }

    fn predict_proba(&self, input: &FeatureMatrix) -> Result<Option<Vec<Vec<f64>>>> {
        let rows = self
            .decision_function(input)?
            .into_iter()
            .map(|raw| {
                let p = sigmoid(raw);
                vec![1.0 - p, p]
            })
            .collect();
        Ok(Some(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::tree::tests::stump;
    use ndarray::array;

    #[test]
    fn test_raw_score_accumulates_scaled_leaves() {
        let model = GradientBoostingClassifier::new(
            1,
            -0.5,
            0.1,
            vec![stump(vec![-1.0], vec![2.0]), stump(vec![-1.0], vec![3.0])],
        );

        let raw = model.decision_function(&array![[0.0], [1.0]]).unwrap();
        assert!((raw[0] - (-0.7)).abs() < 1e-12);
        assert!((raw[1] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_probabilities_follow_sigmoid_of_raw_score() {
        let model =
            GradientBoostingClassifier::new(1, 0.0, 1.0, vec![stump(vec![-2.0], vec![2.0])]);

        let proba = model.predict_proba(&array![[1.0]]).unwrap().unwrap();
        assert!((proba[0][1] - sigmoid(2.0)).abs() < 1e-12);
        assert_eq!(model.predict(&array![[1.0]]).unwrap(), vec![1.0]);
        assert_eq!(model.predict(&array![[0.0]]).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_no_trees_predicts_prior() {
        let model = GradientBoostingClassifier::new(2, 1.5, 0.1, vec![]);
        let proba = model.predict_proba(&array![[0.0, 0.0]]).unwrap().unwrap();
        assert!((proba[0][1] - sigmoid(1.5)).abs() < 1e-12);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_vector_leaves() {
        let model =
            GradientBoostingClassifier::new(1, 0.0, 0.1, vec![stump(vec![1.0, 2.0], vec![0.0, 0.0])]);
        assert!(model.validate().is_err());
    }
}
