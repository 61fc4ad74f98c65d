//! Observability infrastructure for the scoring service
//!
//! Provides:
//! - Prometheus metrics (prediction latency, prediction counts, loaded artifacts)
//! - Structured JSON logging with tracing

use crate::error::ScoringError;
use crate::models::PredictionResult;
use crate::store::ArtifactStore;
use prometheus::{
    register_histogram, register_int_counter_vec, register_int_gauge, Histogram, IntCounterVec,
    IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.5,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ServiceMetricsInner> = OnceLock::new();

struct ServiceMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounterVec,
    prediction_errors_total: IntCounterVec,
    models_loaded: IntGauge,
    scaler_loaded: IntGauge,
}

impl ServiceMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "credit_api_prediction_latency_seconds",
                "Time spent scaling features and running the selected model",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter_vec!(
                "credit_api_predictions_total",
                "Predictions served, by model used and recommendation",
                &["model", "recommendation"]
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter_vec!(
                "credit_api_prediction_errors_total",
                "Rejected or failed prediction requests, by error kind",
                &["kind"]
            )
            .expect("Failed to register prediction_errors_total"),

            models_loaded: register_int_gauge!(
                "credit_api_models_loaded",
                "Number of models loaded at startup"
            )
            .expect("Failed to register models_loaded"),

            scaler_loaded: register_int_gauge!(
                "credit_api_scaler_loaded",
                "1 if the feature scaler loaded at startup"
            )
            .expect("Failed to register scaler_loaded"),
        }
    }
}

/// Service metrics for Prometheus exposition
///
/// A lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct ServiceMetrics {
    _private: (),
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ServiceMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self, result: &PredictionResult) {
        self.inner()
            .predictions_total
            .with_label_values(&[result.model_used.as_str(), result.recommendation.as_str()])
            .inc();
    }

    /// Count a failed request under its error code
    pub fn inc_prediction_errors(&self, kind: &str) {
        self.inner()
            .prediction_errors_total
            .with_label_values(&[kind])
            .inc();
    }

    /// Record the startup artifact state
    pub fn set_artifacts(&self, store: &ArtifactStore) {
        self.inner().models_loaded.set(store.model_count() as i64);
        self.inner()
            .scaler_loaded
            .set(i64::from(store.scaler().is_some()));
    }
}

/// Structured logger for service events
///
/// Provides consistent JSON-formatted logging for startup, predictions and
/// shutdown.
#[derive(Clone)]
pub struct ServiceLogger {
    instance: String,
}

impl ServiceLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, store: &ArtifactStore) {
        let available: Vec<&str> = store.models().map(|m| m.id().key()).collect();
        info!(
            event = "service_started",
            instance = %self.instance,
            service_version = %version,
            models_loaded = store.model_count(),
            available_models = ?available,
            scaler_loaded = store.scaler().is_some(),
            "Credit scoring API started"
        );

        let failed = store.report().failures().count();
        if failed > 0 {
            warn!(
                event = "artifacts_degraded",
                instance = %self.instance,
                failed_artifacts = failed,
                "Serving with a degraded artifact set"
            );
        }
    }

    /// Log a served prediction
    pub fn log_prediction(&self, requested: &str, result: &PredictionResult, elapsed_secs: f64) {
        info!(
            event = "prediction_served",
            instance = %self.instance,
            requested_model = %requested,
            model_used = %result.model_used,
            prediction = result.prediction,
            probability = ?result.probability,
            confidence = result.confidence.as_str(),
            recommendation = result.recommendation.as_str(),
            elapsed_secs = elapsed_secs,
            "Prediction served"
        );
    }

    /// Log a rejected or failed prediction
    pub fn log_prediction_failure(&self, requested: &str, error: &ScoringError) {
        match error {
            ScoringError::Inference(_) => {
                warn!(
                    event = "prediction_failed",
                    instance = %self.instance,
                    requested_model = %requested,
                    kind = error.kind(),
                    error = %error,
                    "Prediction failed"
                );
            }
            _ => {
                info!(
                    event = "prediction_failed",
                    instance = %self.instance,
                    requested_model = %requested,
                    kind = error.kind(),
                    error = %error,
                    "Prediction rejected"
                );
            }
        }
    }

    /// Log a request whose body could not be read
    pub fn log_request_rejected(&self, reason: &str) {
        info!(
            event = "prediction_failed",
            instance = %self.instance,
            kind = "validation",
            error = %reason,
            "Prediction request rejected"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Credit scoring API shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, Recommendation};

    #[test]
    fn test_service_metrics_creation() {
        // Metrics live in the global Prometheus registry, so every handle
        // shares one registration.
        let metrics = ServiceMetrics::new();
        let again = ServiceMetrics::new();

        metrics.observe_prediction_latency(0.0001);
        metrics.inc_predictions(&PredictionResult {
            prediction: 1.0,
            probability: Some(0.9),
            confidence: Confidence::High,
            model_used: "Random Forest".to_string(),
            recommendation: Recommendation::Approve,
        });
        again.inc_prediction_errors(ScoringError::NoModelAvailable.kind());
        again.set_artifacts(&ArtifactStore::from_parts(vec![], None));

        let families = prometheus::gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "credit_api_predictions_total"));
    }

    #[test]
    fn test_service_logger_creation() {
        let logger = ServiceLogger::new("test-instance");
        assert_eq!(logger.instance, "test-instance");
    }
}
