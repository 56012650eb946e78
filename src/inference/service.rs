//! The credit-worthiness scoring service.
//!
//! A [`CreditScorer`] is built once from an artifact and is immutable
//! afterwards: every call reads the same model, scaler and feature order, and
//! performs no I/O. It is `Send + Sync`, so one instance can be shared behind
//! an `Arc` by any number of threads.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::{FeatureVector, ModelKind, PredictionResult};
use crate::error::AppError;
use crate::io::{ArtifactMetadata, LoadedArtifact, read_artifact};
use crate::models::ModelArtifact;

#[derive(Debug, Clone)]
pub struct CreditScorer {
    artifact: ModelArtifact,
    metadata: Option<ArtifactMetadata>,
}

impl CreditScorer {
    /// Load and validate an artifact file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        Ok(Self::from(read_artifact(path)?))
    }

    /// Serve an in-memory artifact (validated first).
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, AppError> {
        artifact.validate()?;
        Ok(Self {
            artifact,
            metadata: None,
        })
    }

    pub fn model_kind(&self) -> ModelKind {
        self.artifact.model.kind()
    }

    /// Field names in the order the model consumes them.
    pub fn feature_order(&self) -> &[String] {
        &self.artifact.feature_order
    }

    /// Training-time metadata, when loaded from a file.
    pub fn metadata(&self) -> Option<&ArtifactMetadata> {
        self.metadata.as_ref()
    }

    /// Score a name -> number mapping. Extra keys are ignored.
    pub fn predict_mapping(&self, input: &Map<String, Value>) -> Result<PredictionResult, AppError> {
        let row = self
            .artifact
            .feature_order
            .iter()
            .map(|name| match input.get(name) {
                None => Err(AppError::schema(name, "is missing")),
                Some(v) => v
                    .as_f64()
                    .filter(|x| x.is_finite())
                    .ok_or_else(|| AppError::schema(name, format!("is not numeric (got {v})"))),
            })
            .collect::<Result<Vec<f64>, AppError>>()
            .inspect_err(|e| warn!(error = %e, "rejected prediction input"))?;

        let prepared = self.artifact.prepare_row(&row);
        let p_worthy = self.artifact.model.predict_proba(&prepared);
        Ok(PredictionResult::from_probability_worthy(p_worthy))
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<PredictionResult, AppError> {
        self.predict_mapping(&features.to_mapping())
    }

    /// Score a JSON object such as `{"age": 35, "income": 65000, ...}`.
    pub fn predict_json(&self, json: &str) -> Result<PredictionResult, AppError> {
        match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(map)) => self.predict_mapping(&map),
            Ok(other) => Err(AppError::Validation(format!(
                "prediction input must be a JSON object, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(AppError::Validation(format!("prediction input is not valid JSON: {e}"))),
        }
    }
}

impl From<LoadedArtifact> for CreditScorer {
    fn from(loaded: LoadedArtifact) -> Self {
        Self {
            artifact: loaded.artifact,
            metadata: Some(loaded.metadata),
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
