//! Model artifact container.
//!
//! An artifact is one JSON document:
//!
//! ```text
//! { "format": "credit-scorer-artifact", "version": 1, "checksum": "<sha256 hex>", "payload": { ... } }
//! ```
//!
//! The checksum covers the exact payload bytes as stored, so any edit to the
//! payload (or truncation of the file) is caught before deserialization. The
//! payload carries the model, the optional scaler, the feature order and some
//! audit metadata. Loading either returns a fully validated artifact or an
//! `ArtifactLoad` error naming the component at fault; there is no partial load.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::AppError;
use crate::fit::ClassificationMetrics;
use crate::models::{Classifier, ModelArtifact, StandardScaler};

pub const ARTIFACT_FORMAT: &str = "credit-scorer-artifact";
pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Container<'a> {
    format: String,
    version: u32,
    checksum: String,
    #[serde(borrow)]
    payload: &'a RawValue,
}

#[derive(Serialize, Deserialize)]
struct Payload {
    created_at: DateTime<Utc>,
    model_name: String,
    metrics: ClassificationMetrics,
    requires_scaling: bool,
    feature_order: Vec<String>,
    model: Classifier,
    scaler: Option<StandardScaler>,
}

/// Audit information stored next to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactMetadata {
    pub created_at: DateTime<Utc>,
    pub model_name: String,
    /// Held-out metrics of the model at training time.
    pub metrics: ClassificationMetrics,
}

/// A validated artifact plus its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedArtifact {
    pub artifact: ModelArtifact,
    pub metadata: ArtifactMetadata,
}

fn checksum(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Serialize an artifact into container bytes.
pub fn encode_artifact(
    artifact: &ModelArtifact,
    metrics: &ClassificationMetrics,
    created_at: DateTime<Utc>,
) -> Result<Vec<u8>, AppError> {
    artifact.validate()?;

    let payload = Payload {
        created_at,
        model_name: artifact.model.kind().display_name().to_string(),
        metrics: metrics.clone(),
        requires_scaling: artifact.scaler.is_some(),
        feature_order: artifact.feature_order.clone(),
        model: artifact.model.clone(),
        scaler: artifact.scaler.clone(),
    };
    let payload_json =
        serde_json::to_string(&payload).map_err(|e| AppError::Io(format!("failed to encode artifact payload: {e}")))?;
    let checksum = checksum(payload_json.as_bytes());
    let raw = RawValue::from_string(payload_json)
        .map_err(|e| AppError::Io(format!("failed to encode artifact payload: {e}")))?;

    let container = Container {
        format: ARTIFACT_FORMAT.to_string(),
        version: ARTIFACT_VERSION,
        checksum,
        payload: &raw,
    };
    serde_json::to_vec_pretty(&container).map_err(|e| AppError::Io(format!("failed to encode artifact: {e}")))
}

/// Parse and validate container bytes.
pub fn decode_artifact(bytes: &[u8]) -> Result<LoadedArtifact, AppError> {
    let container: Container<'_> =
        serde_json::from_slice(bytes).map_err(|e| AppError::artifact("container", e.to_string()))?;

    if container.format != ARTIFACT_FORMAT {
        return Err(AppError::artifact(
            "format",
            format!("expected `{ARTIFACT_FORMAT}`, found `{}`", container.format),
        ));
    }
    if container.version != ARTIFACT_VERSION {
        return Err(AppError::artifact(
            "version",
            format!("unsupported version {} (expected {ARTIFACT_VERSION})", container.version),
        ));
    }
    let actual = checksum(container.payload.get().as_bytes());
    if !actual.eq_ignore_ascii_case(&container.checksum) {
        return Err(AppError::artifact(
            "checksum",
            format!("payload hashes to {actual}, container records {}", container.checksum),
        ));
    }

    let payload: Payload = serde_json::from_str(container.payload.get()).map_err(|e| {
        let component = ["model", "scaler", "feature_order", "metrics"]
            .into_iter()
            .find(|c| e.to_string().contains(&format!("`{c}`")))
            .unwrap_or("payload");
        AppError::artifact(component, e.to_string())
    })?;

    if payload.requires_scaling != payload.scaler.is_some() {
        return Err(AppError::artifact(
            "scaler",
            format!(
                "requires_scaling={} but scaler is {}",
                payload.requires_scaling,
                if payload.scaler.is_some() { "present" } else { "absent" }
            ),
        ));
    }
    let kind = payload.model.kind();
    if payload.model_name != kind.display_name() {
        return Err(AppError::artifact(
            "model_name",
            format!("`{}` does not describe a {} model", payload.model_name, kind.display_name()),
        ));
    }

    let artifact = ModelArtifact {
        model: payload.model,
        scaler: payload.scaler,
        feature_order: payload.feature_order,
    };
    artifact.validate()?;

    Ok(LoadedArtifact {
        artifact,
        metadata: ArtifactMetadata {
            created_at: payload.created_at,
            model_name: payload.model_name,
            metrics: payload.metrics,
        },
    })
}

/// Write the artifact atomically (temp file + rename), creating parent directories.
pub fn write_artifact(path: &Path, artifact: &ModelArtifact, metrics: &ClassificationMetrics) -> Result<(), AppError> {
    let bytes = encode_artifact(artifact, metrics, Utc::now())?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Io(format!("failed to create '{}': {e}", parent.display())))?;
    }
    let tmp = path.with_extension("tmp");
    let mut file = File::create(&tmp)
        .map_err(|e| AppError::Io(format!("failed to create artifact '{}': {e}", tmp.display())))?;
    file.write_all(&bytes)
        .and_then(|_| file.sync_all())
        .map_err(|e| AppError::Io(format!("failed to write artifact '{}': {e}", tmp.display())))?;
    fs::rename(&tmp, path)
        .map_err(|e| AppError::Io(format!("failed to move artifact into '{}': {e}", path.display())))?;

    info!(
        path = %path.display(),
        model = artifact.model.kind().display_name(),
        scaled = artifact.scaler.is_some(),
        "wrote artifact"
    );
    Ok(())
}

/// Read and validate an artifact file.
pub fn read_artifact(path: &Path) -> Result<LoadedArtifact, AppError> {
    let bytes = fs::read(path).map_err(|e| AppError::artifact("file", format!("cannot read '{}': {e}", path.display())))?;
    let loaded = decode_artifact(&bytes)?;
    info!(
        path = %path.display(),
        model = %loaded.metadata.model_name,
        created_at = %loaded.metadata.created_at,
        "loaded artifact"
    );
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FEATURE_NAMES, ModelKind, TrainConfig};
    use crate::models::train;

    fn toy() -> (Vec<Vec<f64>>, Vec<bool>) {
        let x: Vec<Vec<f64>> = (0..80)
            .map(|i| (0..FEATURE_NAMES.len()).map(|j| ((i * (j + 5)) % 31) as f64 * 1.7).collect())
            .collect();
        let y = x.iter().map(|r| r[1] + r[3] > 50.0).collect();
        (x, y)
    }

    fn metrics() -> ClassificationMetrics {
        ClassificationMetrics {
            accuracy: 0.9,
            precision: 0.8,
            recall: 0.7,
            f1: 0.746_666_666_666_666_7,
            roc_auc: 0.95,
            tp: 7,
            fp: 2,
            tn: 10,
            fn_count: 3,
        }
    }

    fn artifact(kind: ModelKind) -> ModelArtifact {
        let (x, y) = toy();
        let config = TrainConfig {
            forest_trees: 4,
            ..TrainConfig::default()
        };
        let scaler = StandardScaler::fit(&x).unwrap();
        let (train_x, scaler) = if kind.requires_scaling() {
            (scaler.transform(&x), Some(scaler))
        } else {
            (x, None)
        };
        ModelArtifact {
            model: train(kind, &train_x, &y, &config).unwrap(),
            scaler,
            feature_order: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn encode_decode_preserves_everything() {
        for kind in [ModelKind::RandomForest, ModelKind::LogisticRegression, ModelKind::DecisionTree] {
            let a = artifact(kind);
            let bytes = encode_artifact(&a, &metrics(), fixed_time()).unwrap();
            let loaded = decode_artifact(&bytes).unwrap();
            assert_eq!(loaded.artifact, a);
            assert_eq!(loaded.metadata.metrics, metrics());
            assert_eq!(loaded.metadata.created_at, fixed_time());
            assert_eq!(loaded.metadata.model_name, kind.display_name());
        }
    }

    #[test]
    fn tampered_payload_fails_checksum() {
        let bytes = encode_artifact(&artifact(ModelKind::LogisticRegression), &metrics(), fixed_time()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let tampered = text.replacen("\"accuracy\":0.9", "\"accuracy\":0.99", 1);
        assert_ne!(text, tampered);

        let err = decode_artifact(tampered.as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::ArtifactLoad { ref component, .. } if component == "checksum"));
    }

    #[test]
    fn wrong_format_or_version_is_rejected() {
        let bytes = encode_artifact(&artifact(ModelKind::DecisionTree), &metrics(), fixed_time()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let other = text.replacen(ARTIFACT_FORMAT, "something-else", 1);
        let err = decode_artifact(other.as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::ArtifactLoad { ref component, .. } if component == "format"));

        let future = text.replacen("\"version\": 1", "\"version\": 2", 1);
        let err = decode_artifact(future.as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::ArtifactLoad { ref component, .. } if component == "version"));
    }

    #[test]
    fn missing_scaler_is_caught_even_with_valid_checksum() {
        // Re-sign a payload whose scaler was removed.
        let bytes = encode_artifact(&artifact(ModelKind::LogisticRegression), &metrics(), fixed_time()).unwrap();
        let container: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let mut payload = container["payload"].clone();
        payload.as_object_mut().unwrap().remove("scaler");
        let payload_json = serde_json::to_string(&payload).unwrap();
        let forged = serde_json::json!({
            "format": ARTIFACT_FORMAT,
            "version": ARTIFACT_VERSION,
            "checksum": checksum(payload_json.as_bytes()),
            "payload": serde_json::from_str::<serde_json::Value>(&payload_json).unwrap(),
        });
        // Re-serializing the Value must keep payload bytes identical for the checksum to hold.
        let forged_bytes = serde_json::to_vec(&forged).unwrap();

        let err = decode_artifact(&forged_bytes).unwrap_err();
        assert!(matches!(err, AppError::ArtifactLoad { ref component, .. } if component == "scaler"));
    }

    #[test]
    fn truncated_file_is_a_container_error() {
        let bytes = encode_artifact(&artifact(ModelKind::DecisionTree), &metrics(), fixed_time()).unwrap();
        let err = decode_artifact(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, AppError::ArtifactLoad { ref component, .. } if component == "container"));
    }

    #[test]
    fn file_round_trip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("credit_model.json");
        let a = artifact(ModelKind::RandomForest);

        write_artifact(&path, &a, &metrics()).unwrap();
        assert!(!path.with_extension("tmp").exists());
        assert_eq!(read_artifact(&path).unwrap().artifact, a);

        let err = read_artifact(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, AppError::ArtifactLoad { ref component, .. } if component == "file"));
        assert_eq!(err.exit_code(), 5);
    }
}
