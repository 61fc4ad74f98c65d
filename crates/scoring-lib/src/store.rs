//! Artifact store: trained models and the optional scaler, loaded once
//!
//! Artifacts are looked up by conventional file names inside one directory:
//! - `scaler.json` (optional standard scaler)
//! - `<model_key>.json`, falling back to `<model_key>.onnx`, for every
//!   [`ModelId`] in canonical order
//!
//! A missing or broken artifact never aborts loading. It is logged, recorded
//! in the [`LoadReport`] and left out of the store.

use crate::error::ArtifactError;
use crate::models::{ModelId, FEATURE_COUNT};
use crate::scorer::{
    FeatureTransform, GradientBoostingClassifier, LogisticRegression, OnnxScorer,
    RandomForestClassifier, Scorer, StandardScaler,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// File name of the scaler artifact
pub const SCALER_FILE: &str = "scaler.json";

/// Report key used for the scaler artifact
pub const SCALER_KEY: &str = "scaler";

/// On-disk encoding of a model artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Json,
    Onnx,
}

impl ArtifactFormat {
    /// Lookup order when several encodings exist for one model
    pub const PRECEDENCE: [ArtifactFormat; 2] = [ArtifactFormat::Json, ArtifactFormat::Onnx];

    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Json => "json",
            ArtifactFormat::Onnx => "onnx",
        }
    }
}

/// Outcome of loading one artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded { checksum: String },
    Missing,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub artifact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(flatten)]
    pub outcome: LoadOutcome,
}

/// What happened to every artifact at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    pub loaded_at: i64,
    pub artifacts: Vec<ArtifactRecord>,
}

impl LoadReport {
    fn new() -> Self {
        Self {
            loaded_at: chrono::Utc::now().timestamp(),
            artifacts: Vec::new(),
        }
    }

    pub fn outcome(&self, artifact: &str) -> Option<&LoadOutcome> {
        self.artifacts
            .iter()
            .find(|r| r.artifact == artifact)
            .map(|r| &r.outcome)
    }

    /// Artifacts that were present but could not be loaded
    pub fn failures(&self) -> impl Iterator<Item = &ArtifactRecord> {
        self.artifacts
            .iter()
            .filter(|r| matches!(r.outcome, LoadOutcome::Failed { .. }))
    }
}

/// A loaded model
pub struct ModelEntry {
    id: ModelId,
    scorer: Box<dyn Scorer>,
}

impl ModelEntry {
    pub fn new(id: ModelId, scorer: Box<dyn Scorer>) -> Self {
        Self { id, scorer }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn display_name(&self) -> &'static str {
        self.id.display_name()
    }

    pub fn scorer(&self) -> &dyn Scorer {
        self.scorer.as_ref()
    }
}

/// Immutable set of loaded models plus the optional scaler
pub struct ArtifactStore {
    models: BTreeMap<ModelId, ModelEntry>,
    scaler: Option<Box<dyn FeatureTransform>>,
    report: LoadReport,
}

impl ArtifactStore {
    /// Load every known artifact from `dir`
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        info!(dir = %dir.display(), "Loading artifacts");

        let mut report = LoadReport::new();

        let path = dir.join(SCALER_FILE);
        let scaler = match load_scaler(&path) {
            Ok(Some((scaler, checksum))) => {
                info!(event = "artifact_loaded", artifact = SCALER_KEY, checksum = %checksum, "Scaler loaded");
                report.artifacts.push(loaded(SCALER_KEY, path, checksum));
                Some(scaler)
            }
            Ok(None) => {
                debug!(event = "artifact_missing", artifact = SCALER_KEY, "No scaler artifact, using raw features");
                report.artifacts.push(missing(SCALER_KEY));
                None
            }
            Err(e) => {
                warn!(event = "artifact_failed", artifact = SCALER_KEY, error = %e, "Failed to load scaler, using raw features");
                report.artifacts.push(failed(SCALER_KEY, path, &e));
                None
            }
        };

        let mut models = BTreeMap::new();
        for id in ModelId::ALL {
            let Some((path, format)) = locate_model(dir, id) else {
                debug!(event = "artifact_missing", artifact = %id, "No artifact for model");
                report.artifacts.push(missing(id.key()));
                continue;
            };

            match load_model(id, &path, format) {
                Ok((scorer, checksum)) => {
                    info!(
                        event = "artifact_loaded",
                        artifact = %id,
                        format = format.extension(),
                        checksum = %checksum,
                        "Model loaded"
                    );
                    report.artifacts.push(loaded(id.key(), path, checksum));
                    models.insert(id, ModelEntry::new(id, scorer));
                }
                Err(e) => {
                    error!(event = "artifact_failed", artifact = %id, error = %e, "Failed to load model");
                    report.artifacts.push(failed(id.key(), path, &e));
                }
            }
        }

        info!(
            event = "models_available",
            models_loaded = models.len(),
            scaler_loaded = scaler.is_some(),
            "{} models available",
            models.len()
        );

        Self {
            models,
            scaler,
            report,
        }
    }

    /// Build a store from scorers that are already in memory
    pub fn from_parts(
        models: Vec<(ModelId, Box<dyn Scorer>)>,
        scaler: Option<Box<dyn FeatureTransform>>,
    ) -> Self {
        let models = models
            .into_iter()
            .map(|(id, scorer)| (id, ModelEntry::new(id, scorer)))
            .collect();
        Self {
            models,
            scaler,
            report: LoadReport::new(),
        }
    }

    /// Loaded models in canonical order
    pub fn models(&self) -> impl Iterator<Item = &ModelEntry> {
        self.models.values()
    }

    pub fn get(&self, id: ModelId) -> Option<&ModelEntry> {
        self.models.get(&id)
    }

    /// First loaded model in canonical order
    pub fn first(&self) -> Option<&ModelEntry> {
        self.models.values().next()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn available_models(&self) -> Vec<ModelId> {
        self.models.keys().copied().collect()
    }

    pub fn scaler(&self) -> Option<&dyn FeatureTransform> {
        self.scaler.as_deref()
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}

fn locate_model(dir: &Path, id: ModelId) -> Option<(PathBuf, ArtifactFormat)> {
    ArtifactFormat::PRECEDENCE.into_iter().find_map(|format| {
        let path = dir.join(format!("{}.{}", id.key(), format.extension()));
        path.is_file().then_some((path, format))
    })
}

fn load_scaler(path: &Path) -> Result<Option<(Box<dyn FeatureTransform>, String)>, ArtifactError> {
    if !path.is_file() {
        return Ok(None);
    }
    let bytes = read_artifact(path)?;
    let scaler: StandardScaler =
        decode_validated(path, &bytes, |s: &StandardScaler| s.validate(FEATURE_COUNT))?;
    Ok(Some((Box::new(scaler), compute_checksum(&bytes))))
}

fn load_model(
    id: ModelId,
    path: &Path,
    format: ArtifactFormat,
) -> Result<(Box<dyn Scorer>, String), ArtifactError> {
    let bytes = read_artifact(path)?;

    let scorer: Box<dyn Scorer> = match format {
        ArtifactFormat::Json => match id {
            ModelId::LogisticRegression => Box::new(decode_validated(
                path,
                &bytes,
                LogisticRegression::validate,
            )?),
            ModelId::RandomForest => Box::new(decode_validated(
                path,
                &bytes,
                RandomForestClassifier::validate,
            )?),
            ModelId::GradientBoosting => Box::new(decode_validated(
                path,
                &bytes,
                GradientBoostingClassifier::validate,
            )?),
        },
        ArtifactFormat::Onnx => Box::new(OnnxScorer::from_bytes(&bytes, FEATURE_COUNT).map_err(
            |e| ArtifactError::Onnx {
                path: path.to_path_buf(),
                message: format!("{:#}", e),
            },
        )?),
    };

    Ok((scorer, compute_checksum(&bytes)))
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn decode_validated<T, F>(path: &Path, bytes: &[u8], validate: F) -> Result<T, ArtifactError>
where
    T: DeserializeOwned,
    F: Fn(&T) -> Result<(), String>,
{
    let value: T = serde_json::from_slice(bytes).map_err(|source| ArtifactError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&value).map_err(|reason| ArtifactError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok(value)
}

/// SHA-256 of the artifact bytes, hex encoded
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn loaded(artifact: &str, path: PathBuf, checksum: String) -> ArtifactRecord {
    ArtifactRecord {
        artifact: artifact.to_string(),
        path: Some(path),
        outcome: LoadOutcome::Loaded { checksum },
    }
}

fn missing(artifact: &str) -> ArtifactRecord {
    ArtifactRecord {
        artifact: artifact.to_string(),
        path: None,
        outcome: LoadOutcome::Missing,
    }
}

fn failed(artifact: &str, path: PathBuf, error: &ArtifactError) -> ArtifactRecord {
    ArtifactRecord {
        artifact: artifact.to_string(),
        path: Some(path),
        outcome: LoadOutcome::Failed {
            error: error.to_string(),
        },
    }
}
