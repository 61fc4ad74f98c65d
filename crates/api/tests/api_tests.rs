//! Integration tests for the credit API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use credit_api::api::{create_router, AppState};
use scoring_lib::scorer::{FeatureMatrix, LogisticRegression, Scorer};
use scoring_lib::{ArtifactStore, InferenceDispatcher, ModelId, ServiceLogger, ServiceMetrics};
use std::sync::Arc;
use tower::ServiceExt;

/// Fixed-output model
struct StubScorer {
    prediction: f64,
    proba: Option<Vec<f64>>,
}

impl Scorer for StubScorer {
    fn predict(&self, _input: &FeatureMatrix) -> anyhow::Result<Vec<f64>> {
        Ok(vec![self.prediction])
    }

    fn predict_proba(&self, _input: &FeatureMatrix) -> anyhow::Result<Option<Vec<Vec<f64>>>> {
        Ok(self.proba.clone().map(|p| vec![p]))
    }
}

fn stub(prediction: f64, proba: Option<Vec<f64>>) -> Box<dyn Scorer> {
    Box::new(StubScorer { prediction, proba })
}

fn setup_test_app(models: Vec<(ModelId, Box<dyn Scorer>)>) -> Router {
    let store = Arc::new(ArtifactStore::from_parts(models, None));
    let state = Arc::new(AppState::new(
        InferenceDispatcher::new(store),
        ServiceMetrics::new(),
        ServiceLogger::new("test"),
    ));
    create_router(state)
}

async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_predict(app: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_reports_loaded_models() {
    let app = setup_test_app(vec![
        (ModelId::RandomForest, stub(1.0, None)),
        (ModelId::LogisticRegression, stub(1.0, None)),
    ]);

    let (status, health) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["message"], "API running");
    assert_eq!(health["models_loaded"], 2);
    assert_eq!(
        health["available_models"],
        serde_json::json!(["logistic_regression", "random_forest"])
    );
}

#[tokio::test]
async fn test_health_ok_with_no_models() {
    let app = setup_test_app(vec![]);

    let (status, health) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["models_loaded"], 0);
    assert_eq!(health["status"], "unhealthy");
}

#[tokio::test]
async fn test_readyz_follows_model_availability() {
    let (status, readiness) = get(setup_test_app(vec![]), "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(readiness["ready"], false);

    let app = setup_test_app(vec![(ModelId::GradientBoosting, stub(0.0, None))]);
    let (status, readiness) = get(app, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(readiness["ready"], true);
}

#[tokio::test]
async fn test_models_lists_key_and_display_name() {
    let app = setup_test_app(vec![
        (ModelId::GradientBoosting, stub(1.0, None)),
        (ModelId::LogisticRegression, stub(1.0, None)),
    ]);

    let (status, body) = get(app, "/models").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({"models": [
            {"key": "logistic_regression", "name": "Logistic Regression"},
            {"key": "gradient_boosting", "name": "Gradient Boosting"}
        ]})
    );
}

#[tokio::test]
async fn test_artifacts_returns_load_report() {
    let (status, body) = get(setup_test_app(vec![]), "/artifacts").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["artifacts"].is_array());
    assert!(body["loaded_at"].is_i64());
}

#[tokio::test]
async fn test_predict_end_to_end() {
    let app = setup_test_app(vec![(
        ModelId::LogisticRegression,
        stub(0.75, Some(vec![0.2, 0.8])),
    )]);

    let (status, body) = post_predict(
        app,
        serde_json::json!({
            "features": [0.5, 1.2, -0.3, 2.0, 0.0, 1.0],
            "model_name": "logistic_regression"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({
            "prediction": 0.75,
            "probability": 0.8,
            "confidence": "High",
            "model_used": "Logistic Regression",
            "recommendation": "Approval recommended"
        })
    );
}

#[tokio::test]
async fn test_predict_defaults_and_falls_back() {
    let app = setup_test_app(vec![(ModelId::RandomForest, stub(0.5, None))]);

    let (status, body) = post_predict(
        app,
        serde_json::json!({"features": [1, 2, 3, 4, 5, 6]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_used"], "Random Forest");
    assert!(body["probability"].is_null());
    assert_eq!(body["confidence"], "Low");
    assert_eq!(body["recommendation"], "Review carefully");
}

#[tokio::test]
async fn test_predict_with_real_logistic_model() {
    let model: Box<dyn Scorer> = Box::new(LogisticRegression::new(vec![0.0; 6], -3.0));
    let app = setup_test_app(vec![(ModelId::LogisticRegression, model)]);

    let (status, body) = post_predict(
        app,
        serde_json::json!({"features": [0, 0, 0, 0, 0, 0], "model_name": "logistic_regression"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], 0.0);
    // max(1 - sigmoid(-3), sigmoid(-3)) is about 0.95
    assert_eq!(body["confidence"], "High");
    assert_eq!(body["recommendation"], "Not recommended");
}

#[tokio::test]
async fn test_predict_rejects_wrong_feature_count() {
    let app = setup_test_app(vec![(ModelId::LogisticRegression, stub(1.0, None))]);

    let (status, body) = post_predict(app, serde_json::json!({"features": [1, 2, 3]})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation");
    assert!(body["error"].as_str().unwrap().contains("expected 6 features"));
}

#[tokio::test]
async fn test_predict_rejects_missing_features() {
    let app = setup_test_app(vec![(ModelId::LogisticRegression, stub(1.0, None))]);

    let (status, body) =
        post_predict(app, serde_json::json!({"model_name": "random_forest"})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation");
    assert!(body["error"].as_str().unwrap().contains("features"));
}

#[tokio::test]
async fn test_predict_rejects_non_numeric_feature() {
    let app = setup_test_app(vec![(ModelId::LogisticRegression, stub(1.0, None))]);

    let (status, body) =
        post_predict(app, serde_json::json!({"features": [1, 2, "x", 4, 5, 6]})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation");
    assert!(body["error"].as_str().unwrap().contains("features[2]"));
}

#[tokio::test]
async fn test_predict_rejects_malformed_json() {
    let app = setup_test_app(vec![(ModelId::LogisticRegression, stub(1.0, None))]);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header("content-type", "application/json")
                .body(Body::from("{\"features\": [1, 2"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], "validation");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_predict_returns_503_without_models() {
    let app = setup_test_app(vec![]);

    let (status, body) = post_predict(
        app,
        serde_json::json!({"features": [0.5, 1.2, -0.3, 2.0, 0.0, 1.0]}),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "no_model_available");
}

#[tokio::test]
async fn test_predict_returns_500_on_inference_failure() {
    // Model trained on 4 features cannot score a 6 feature row
    let model: Box<dyn Scorer> = Box::new(LogisticRegression::new(vec![0.1; 4], 0.0));
    let app = setup_test_app(vec![(ModelId::LogisticRegression, model)]);

    let (status, body) = post_predict(
        app,
        serde_json::json!({"features": [0.5, 1.2, -0.3, 2.0, 0.0, 1.0]}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "inference");
    assert!(body["error"].as_str().unwrap().contains("shape mismatch"));
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let app = setup_test_app(vec![(ModelId::RandomForest, stub(1.0, Some(vec![0.1, 0.9])))]);

    let (status, _) = post_predict(
        app.clone(),
        serde_json::json!({"features": [1, 1, 1, 1, 1, 1], "model_name": "random_forest"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("credit_api_predictions_total"));
    assert!(metrics_text.contains("credit_api_prediction_latency_seconds_bucket"));
}
