//! Health reporting for the scoring service
//!
//! The loaded artifact set never changes after startup, so health is a pure
//! function of the [`ArtifactStore`].

use crate::store::ArtifactStore;
use serde::{Deserialize, Serialize};

/// Health status of the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Every present artifact loaded
    Healthy,
    /// Some artifacts failed to load but at least one model is serving
    Degraded,
    /// No model is available
    Unhealthy,
}

impl ComponentStatus {
    /// Returns true if predictions can be served
    pub fn is_operational(&self) -> bool {
        matches!(self, ComponentStatus::Healthy | ComponentStatus::Degraded)
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
    pub status: ComponentStatus,
    pub models_loaded: usize,
    pub available_models: Vec<String>,
}

impl HealthResponse {
    pub fn from_store(store: &ArtifactStore) -> Self {
        Self {
            message: "API running".to_string(),
            status: Self::compute_status(store),
            models_loaded: store.model_count(),
            available_models: store
                .available_models()
                .iter()
                .map(|id| id.key().to_string())
                .collect(),
        }
    }

    pub fn compute_status(store: &ArtifactStore) -> ComponentStatus {
        if store.is_empty() {
            ComponentStatus::Unhealthy
        } else if store.report().failures().next().is_some() {
            ComponentStatus::Degraded
        } else {
            ComponentStatus::Healthy
        }
    }
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ReadinessResponse {
    pub fn from_store(store: &ArtifactStore) -> Self {
        if store.is_empty() {
            ReadinessResponse {
                ready: false,
                reason: Some("No model available".to_string()),
            }
        } else {
            ReadinessResponse {
                ready: true,
                reason: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelId;
    use crate::scorer::{LogisticRegression, Scorer};
    use std::fs;
    use tempfile::TempDir;

    fn logistic() -> Box<dyn Scorer> {
        Box::new(LogisticRegression::new(vec![0.0; 6], 0.0))
    }

    #[test]
    fn test_empty_store_is_unhealthy_and_not_ready() {
        let store = ArtifactStore::from_parts(vec![], None);

        let health = HealthResponse::from_store(&store);
        assert_eq!(health.status, ComponentStatus::Unhealthy);
        assert!(!health.status.is_operational());
        assert_eq!(health.models_loaded, 0);
        assert!(health.available_models.is_empty());

        let readiness = ReadinessResponse::from_store(&store);
        assert!(!readiness.ready);
        assert!(readiness.reason.is_some());
    }

    #[test]
    fn test_loaded_store_lists_models_in_canonical_order() {
        let store = ArtifactStore::from_parts(
            vec![
                (ModelId::GradientBoosting, logistic()),
                (ModelId::LogisticRegression, logistic()),
            ],
            None,
        );

        let health = HealthResponse::from_store(&store);
        assert_eq!(health.status, ComponentStatus::Healthy);
        assert_eq!(health.models_loaded, 2);
        assert_eq!(
            health.available_models,
            vec!["logistic_regression", "gradient_boosting"]
        );
        assert!(ReadinessResponse::from_store(&store).ready);
    }

    #[test]
    fn test_partial_failure_is_degraded() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("logistic_regression.json"),
            r#"{"n_features": 6, "coefficients": [0, 0, 0, 0, 0, 0], "intercept": 0}"#,
        )
        .unwrap();
        fs::write(dir.path().join("random_forest.json"), "[]").unwrap();

        let store = ArtifactStore::load(dir.path());
        let health = HealthResponse::from_store(&store);
        assert_eq!(health.status, ComponentStatus::Degraded);
        assert!(health.status.is_operational());
        assert_eq!(health.models_loaded, 1);
    }
}
