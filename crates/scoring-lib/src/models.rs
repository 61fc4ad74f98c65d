//! Core data models for the scoring service

use crate::error::ScoringError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of input features every model expects
pub const FEATURE_COUNT: usize = 6;

/// Model used when a request does not name one
pub const DEFAULT_MODEL: &str = "logistic_regression";

/// Identifier of a known model family.
///
/// Declaration order is the canonical order: artifacts are loaded in it and
/// the fallback model is the first loaded one in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    LogisticRegression,
    RandomForest,
    GradientBoosting,
}

impl ModelId {
    /// All identifiers in canonical order
    pub const ALL: [ModelId; 3] = [
        ModelId::LogisticRegression,
        ModelId::RandomForest,
        ModelId::GradientBoosting,
    ];

    /// Artifact key, also the file stem on disk
    pub fn key(&self) -> &'static str {
        match self {
            ModelId::LogisticRegression => "logistic_regression",
            ModelId::RandomForest => "random_forest",
            ModelId::GradientBoosting => "gradient_boosting",
        }
    }

    /// Human-readable name reported in `model_used`
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelId::LogisticRegression => "Logistic Regression",
            ModelId::RandomForest => "Random Forest",
            ModelId::GradientBoosting => "Gradient Boosting",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ModelId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelId::ALL
            .into_iter()
            .find(|id| id.key() == s)
            .ok_or_else(|| format!("unknown model '{}'", s))
    }
}

/// Incoming prediction request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub features: Vec<f64>,
    #[serde(default = "default_model_name")]
    pub model_name: Option<String>,
}

fn default_model_name() -> Option<String> {
    Some(DEFAULT_MODEL.to_string())
}

impl PredictionRequest {
    pub fn new(features: Vec<f64>, model_name: Option<String>) -> Self {
        Self {
            features,
            model_name,
        }
    }

    /// Reject feature vectors of the wrong arity before they reach a model
    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.features.len() != FEATURE_COUNT {
            return Err(ScoringError::Validation {
                expected: FEATURE_COUNT,
                actual: self.features.len(),
            });
        }
        Ok(())
    }

    /// Requested model, with `null` treated like an omitted field
    pub fn requested_model(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Coarse bucketing of the inference score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

/// Business-decision bucketing of the raw prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Approval recommended")]
    Approve,
    #[serde(rename = "Review carefully")]
    Review,
    #[serde(rename = "Not recommended")]
    Decline,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Approve => "Approval recommended",
            Recommendation::Review => "Review carefully",
            Recommendation::Decline => "Not recommended",
        }
    }
}

/// Result of a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: f64,
    pub probability: Option<f64>,
    pub confidence: Confidence,
    pub model_used: String,
    pub recommendation: Recommendation,
}

/// Entry of the `/models` listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelList {
    pub models: Vec<ModelInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id_round_trips_through_key() {
        for id in ModelId::ALL {
            assert_eq!(id.key().parse::<ModelId>().unwrap(), id);
        }
        assert!("svm".parse::<ModelId>().is_err());
    }

    #[test]
    fn test_canonical_order_matches_declaration() {
        let mut ids = ModelId::ALL.to_vec();
        ids.sort();
        assert_eq!(ids, ModelId::ALL.to_vec());
    }

    #[test]
    fn test_request_defaults_model_name() {
        let req: PredictionRequest =
            serde_json::from_str(r#"{"features": [1, 2, 3, 4, 5, 6]}"#).unwrap();
        assert_eq!(req.requested_model(), DEFAULT_MODEL);

        let req: PredictionRequest =
            serde_json::from_str(r#"{"features": [1, 2, 3, 4, 5, 6], "model_name": null}"#)
                .unwrap();
        assert_eq!(req.requested_model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_validate_rejects_wrong_arity() {
        let req = PredictionRequest::new(vec![1.0; 5], None);
        match req.validate() {
            Err(ScoringError::Validation { expected, actual }) => {
                assert_eq!(expected, 6);
                assert_eq!(actual, 5);
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        assert!(PredictionRequest::new(vec![0.0; 6], None).validate().is_ok());
        assert!(PredictionRequest::new(vec![0.0; 7], None).validate().is_err());
    }

    #[test]
    fn test_result_serializes_labels_as_text() {
        let result = PredictionResult {
            prediction: 1.0,
            probability: None,
            confidence: Confidence::Medium,
            model_used: "Random Forest".to_string(),
            recommendation: Recommendation::Review,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["confidence"], "Medium");
        assert_eq!(json["recommendation"], "Review carefully");
        assert!(json["probability"].is_null());
    }
}
