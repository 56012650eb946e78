//! Shared batch workflows behind `credit generate` and `credit train`.
//!
//! generate: config -> dataset -> CSV
//! train:    CSV -> split -> candidates -> selection -> artifact
//!
//! The CLI only formats what these return, so the integration tests can drive
//! the same code paths without spawning the binary.

use std::path::Path;

use tracing::info;

use crate::data::{compute_stats, generate_dataset};
use crate::domain::{DatasetStats, GeneratorConfig, TrainConfig};
use crate::error::AppError;
use crate::fit::{TrainingOutcome, train_and_select};
use crate::io::{read_dataset_csv, write_artifact, write_dataset_csv};

/// Generate a dataset, write it to `output` and return its summary.
pub fn run_generate(config: &GeneratorConfig, output: &Path) -> Result<DatasetStats, AppError> {
    if config.sample_count == 0 {
        return Err(AppError::Configuration("sample count must be at least 1".to_string()));
    }
    let dataset = generate_dataset(config)?;
    write_dataset_csv(output, &dataset)?;
    compute_stats(&dataset).ok_or_else(|| AppError::Configuration("generated an empty dataset".to_string()))
}

/// Train on the CSV at `data`, write the winning artifact to `artifact`.
pub fn run_training(data: &Path, artifact: &Path, config: &TrainConfig) -> Result<TrainingOutcome, AppError> {
    let dataset = read_dataset_csv(data)?;
    let outcome = train_and_select(&dataset, config)?;
    write_artifact(artifact, &outcome.artifact, &outcome.best_result().metrics)?;
    info!(
        model = outcome.best_result().kind.display_name(),
        artifact = %artifact.display(),
        "training complete"
    );
    Ok(outcome)
}
