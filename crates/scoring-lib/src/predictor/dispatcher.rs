//! Inference dispatch: model selection, scaling, scoring and labeling

use super::output;
use crate::error::ScoringError;
use crate::models::{ModelId, PredictionResult};
use crate::store::{ArtifactStore, ModelEntry};
use anyhow::{Context, Result};
use ndarray::Array2;
use std::sync::Arc;
use tracing::debug;

/// Serves predictions from an immutable [`ArtifactStore`]
#[derive(Clone)]
pub struct InferenceDispatcher {
    store: Arc<ArtifactStore>,
}

impl InferenceDispatcher {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// The requested model if it is loaded, otherwise the first loaded model
    /// in canonical order
    pub fn select(&self, requested: &str) -> Result<&ModelEntry, ScoringError> {
        let requested_entry = requested
            .parse::<ModelId>()
            .ok()
            .and_then(|id| self.store.get(id));
        if let Some(entry) = requested_entry {
            return Ok(entry);
        }

        let fallback = self.store.first().ok_or(ScoringError::NoModelAvailable)?;
        debug!(
            requested = %requested,
            substitute = %fallback.id(),
            "Requested model not loaded, using fallback"
        );
        Ok(fallback)
    }

    /// Score one feature vector
    pub fn predict(
        &self,
        features: &[f64],
        requested: &str,
    ) -> Result<PredictionResult, ScoringError> {
        let entry = self.select(requested)?;

        let (prediction, probability) = self
            .infer(entry, features)
            .map_err(|e| ScoringError::Inference(format!("{:#}", e)))?;

        let score = output::score(prediction, probability);
        Ok(PredictionResult {
            prediction,
            probability,
            confidence: output::confidence(score),
            model_used: entry.display_name().to_string(),
            recommendation: output::recommendation(prediction),
        })
    }

    fn infer(&self, entry: &ModelEntry, features: &[f64]) -> Result<(f64, Option<f64>)> {
        let raw = Array2::from_shape_vec((1, features.len()), features.to_vec())
            .context("Failed to build feature matrix")?;

        let input = match self.store.scaler() {
            Some(scaler) => scaler
                .transform(&raw)
                .context("Failed to scale features")?,
            None => raw,
        };

        let (labels, proba) = entry
            .scorer()
            .predict_with_proba(&input)
            .with_context(|| format!("{} prediction failed", entry.id()))?;

        let prediction = *labels.first().context("Model returned no prediction")?;

        let probability = match proba {
            Some(rows) => {
                let row = rows.first().context("Model returned no probabilities")?;
                Some(
                    row.iter()
                        .copied()
                        .reduce(f64::max)
                        .context("Model returned an empty probability row")?,
                )
            }
            None => None,
        };

        Ok((prediction, probability))
    }
}
