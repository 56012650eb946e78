//! Crate-wide error type.
//!
//! Every failure carries enough context (field name, artifact component, file
//! path) to diagnose without inspecting internals, and maps to a stable process
//! exit code for the `credit` binary.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Training inputs or settings that make the run impossible (empty or
    /// single-class dataset, bad eval fraction, degenerate split).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A feature set that does not match the feature schema at train time.
    #[error("validation error: {0}")]
    Validation(String),

    /// Dataset file missing, unreadable, or containing malformed rows.
    #[error("dataset error: {0}")]
    Dataset(String),

    /// A persisted artifact component is missing or corrupt.
    #[error("artifact load error: {component}: {reason}")]
    ArtifactLoad { component: String, reason: String },

    /// An inference input lacks a required field (or carries a non-numeric one).
    #[error("schema mismatch: field `{field}` {reason}")]
    SchemaMismatch { field: String, reason: String },

    /// Output could not be written.
    #[error("i/o error: {0}")]
    Io(String),
}

impl AppError {
    pub fn artifact(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ArtifactLoad {
            component: component.into(),
            reason: reason.into(),
        }
    }

    pub fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Configuration(_) => 2,
            AppError::Validation(_) => 3,
            AppError::Dataset(_) => 4,
            AppError::ArtifactLoad { .. } => 5,
            AppError::SchemaMismatch { .. } => 6,
            AppError::Io(_) => 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let errors = [
            AppError::Configuration(String::new()),
            AppError::Validation(String::new()),
            AppError::Dataset(String::new()),
            AppError::artifact("model", ""),
            AppError::schema("age", ""),
            AppError::Io(String::new()),
        ];
        let mut codes: Vec<u8> = errors.iter().map(AppError::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|&c| c != 0));
    }

    #[test]
    fn messages_name_the_offending_part() {
        let err = AppError::schema("income", "is missing");
        assert_eq!(err.to_string(), "schema mismatch: field `income` is missing");

        let err = AppError::artifact("scaler", "required by logistic regression but absent");
        assert!(err.to_string().contains("scaler"));
    }
}
