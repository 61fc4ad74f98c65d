//! Error types for artifact loading and prediction

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced to prediction callers
#[derive(Debug, Error)]
pub enum ScoringError {
    /// The feature vector has the wrong number of elements
    #[error("expected {expected} features, got {actual}")]
    Validation { expected: usize, actual: usize },

    /// No model artifact loaded successfully at startup
    #[error("no model available")]
    NoModelAvailable,

    /// Matrix construction, scaling or model invocation failed
    #[error("inference failed: {0}")]
    Inference(String),
}

impl ScoringError {
    /// Short machine-readable kind, used as a metrics label and error code
    pub fn kind(&self) -> &'static str {
        match self {
            ScoringError::Validation { .. } => "validation",
            ScoringError::NoModelAvailable => "no_model_available",
            ScoringError::Inference(_) => "inference",
        }
    }
}

/// Failure to load a single artifact. Absorbed by the store.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {path:?}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("failed to load ONNX graph {path:?}: {message}")]
    Onnx { path: PathBuf, message: String },
}
