//! Credit approval scoring library
//!
//! This crate provides the core functionality for:
//! - Loading trained model artifacts and the feature scaler
//! - Scoring feature vectors with logistic regression, random forest,
//!   gradient boosting and ONNX-exported classifiers
//! - Dispatching predictions and labeling their outputs
//! - Health reporting and observability

pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod scorer;
pub mod store;

pub use error::{ArtifactError, ScoringError};
pub use health::{ComponentStatus, HealthResponse, ReadinessResponse};
pub use models::*;
pub use observability::{ServiceLogger, ServiceMetrics};
pub use predictor::InferenceDispatcher;
pub use store::{ArtifactStore, LoadOutcome, LoadReport};
