//! ONNX graph scorer using tract
//!
//! Runs classifiers exported to ONNX (for example with zipmap disabled):
//! output 0 is the label tensor, output 1 (when present) the
//! `[rows, classes]` probability tensor.

use super::{check_width, FeatureMatrix, Scorer};
use anyhow::{Context, Result};
use tract_onnx::prelude::*;
use tracing::debug;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

pub struct OnnxScorer {
    model: TractModel,
    n_features: usize,
}

impl OnnxScorer {
    /// Parse and optimize a graph taking a single `[1, n_features]` f32 row
    pub fn from_bytes(model_bytes: &[u8], n_features: usize) -> Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, n_features]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(Self { model, n_features })
    }

    fn run(&self, input: &FeatureMatrix) -> Result<TVec<TValue>> {
        check_width(input, self.n_features)?;
        if input.nrows() != 1 {
            anyhow::bail!("ONNX graph takes a single row, got {}", input.nrows());
        }

        let data: Vec<f32> = input.iter().map(|x| *x as f32).collect();
        let tensor: Tensor = tract_ndarray::Array2::from_shape_vec((1, self.n_features), data)?.into();
        let outputs = self.model.run(tvec!(tensor.into()))?;
        debug!(outputs = outputs.len(), "ONNX graph evaluated");
        Ok(outputs)
    }
}

fn labels(outputs: &[TValue]) -> Result<Vec<f64>> {
    let labels = outputs
        .first()
        .context("No output from model")?
        .cast_to::<f64>()
        .context("Label output is not numeric")?;
    Ok(labels.as_slice::<f64>()?.to_vec())
}

fn probabilities(outputs: &[TValue]) -> Result<Option<Vec<Vec<f64>>>> {
    let Some(probs) = outputs.get(1) else {
        return Ok(None);
    };

    let probs = probs
        .cast_to::<f64>()
        .context("Probability output is not numeric")?;
    let view = probs.to_array_view::<f64>()?;
    if view.ndim() != 2 {
        anyhow::bail!("Probability output has rank {}, expected 2", view.ndim());
    }
    Ok(Some(
        view.outer_iter()
            .map(|row| row.iter().copied().collect())
            .collect(),
    ))
}

impl Scorer for OnnxScorer {
    fn predict(&self, input: &FeatureMatrix) -> Result<Vec<f64>> {
        labels(&self.run(input)?)
    }

    fn predict_proba(&self, input: &FeatureMatrix) -> Result<Option<Vec<Vec<f64>>>> {
        probabilities(&self.run(input)?)
    }

    /// Both outputs come from a single graph evaluation
    fn predict_with_proba(
        &self,
        input: &FeatureMatrix,
    ) -> Result<(Vec<f64>, Option<Vec<Vec<f64>>>)> {
        let outputs = self.run(input)?;
        Ok((labels(&outputs)?, probabilities(&outputs)?))
    }
}
