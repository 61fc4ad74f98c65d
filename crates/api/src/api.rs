//! HTTP API for predictions, health checks and Prometheus metrics

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use scoring_lib::{
    HealthResponse, InferenceDispatcher, LoadReport, ModelInfo, ModelList, PredictionRequest,
    PredictionResult, ReadinessResponse, ScoringError, ServiceLogger, ServiceMetrics,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: InferenceDispatcher,
    pub metrics: ServiceMetrics,
    pub logger: ServiceLogger,
}

impl AppState {
    pub fn new(dispatcher: InferenceDispatcher, metrics: ServiceMetrics, logger: ServiceLogger) -> Self {
        Self {
            dispatcher,
            metrics,
            logger,
        }
    }
}

/// Error code for requests rejected before scoring
const VALIDATION_CODE: &str = "validation";

/// Error body returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Maps request and scoring failures onto HTTP status codes
#[derive(Debug)]
pub enum ApiError {
    Scoring(ScoringError),
    /// Body could not be read as a prediction request
    Rejected(JsonRejection),
}

impl From<ScoringError> for ApiError {
    fn from(err: ScoringError) -> Self {
        Self::Scoring(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Scoring(err) => {
                let status = match err {
                    ScoringError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    ScoringError::NoModelAvailable => StatusCode::SERVICE_UNAVAILABLE,
                    ScoringError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let body = ErrorResponse {
                    error: err.to_string(),
                    code: err.kind().to_string(),
                };
                (status, body)
            }
            ApiError::Rejected(rejection) => {
                let body = ErrorResponse {
                    error: rejection.body_text(),
                    code: VALIDATION_CODE.to_string(),
                };
                (rejection.status(), body)
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Service summary; always 200 so degraded instances stay inspectable
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::from_store(state.dispatcher.store()))
}

/// Readiness check - returns 200 once a model can serve, 503 otherwise
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = ReadinessResponse::from_store(state.dispatcher.store());

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelList> {
    let models = state
        .dispatcher
        .store()
        .models()
        .map(|entry| ModelInfo {
            key: entry.id().key().to_string(),
            name: entry.display_name().to_string(),
        })
        .collect();
    Json(ModelList { models })
}

async fn artifacts(State(state): State<Arc<AppState>>) -> Json<LoadReport> {
    Json(state.dispatcher.store().report().clone())
}

async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            state.metrics.inc_prediction_errors(VALIDATION_CODE);
            state.logger.log_request_rejected(&rejection.body_text());
            return Err(ApiError::Rejected(rejection));
        }
    };

    let requested = request.requested_model();
    let start = Instant::now();

    let outcome = request
        .validate()
        .and_then(|_| state.dispatcher.predict(&request.features, requested));
    let elapsed = start.elapsed().as_secs_f64();

    match outcome {
        Ok(result) => {
            state.metrics.observe_prediction_latency(elapsed);
            state.metrics.inc_predictions(&result);
            state.logger.log_prediction(requested, &result, elapsed);
            Ok(Json(result))
        }
        Err(e) => {
            state.metrics.inc_prediction_errors(e.kind());
            state.logger.log_prediction_failure(requested, &e);
            Err(e.into())
        }
    }
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/readyz", get(readyz))
        .route("/models", get(list_models))
        .route("/artifacts", get(artifacts))
        .route("/predict", post(predict))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server and run until `shutdown` resolves
pub async fn serve<F>(addr: &str, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
