//! Dataset CSV read/write.
//!
//! Layout: the nine schema columns in canonical order, then `credit_score`,
//! then `credit_worthy` as `0`/`1`. Floats are written with the shortest
//! representation that parses back to the same value, so a written dataset
//! reloads bit-for-bit and the same seed always yields the same bytes.

use std::fs::{self, File};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{Dataset, FEATURE_NAMES, FeatureVector, SCORE_MAX, SCORE_MIN, ScoredSample};
use crate::error::AppError;

const SCORE_COLUMN: &str = "credit_score";
const LABEL_COLUMN: &str = "credit_worthy";

/// One CSV row. Field order defines the column order.
#[derive(Debug, Serialize, Deserialize)]
struct DatasetRecord {
    age: u32,
    income: f64,
    debt_to_income: f64,
    credit_history_length: u32,
    num_credit_accounts: u32,
    payment_history_score: f64,
    credit_utilization: f64,
    num_late_payments: u32,
    employment_years: u32,
    credit_score: u16,
    credit_worthy: u8,
}

impl From<&ScoredSample> for DatasetRecord {
    fn from(s: &ScoredSample) -> Self {
        let f = &s.features;
        Self {
            age: f.age,
            income: f.income,
            debt_to_income: f.debt_to_income,
            credit_history_length: f.credit_history_length,
            num_credit_accounts: f.num_credit_accounts,
            payment_history_score: f.payment_history_score,
            credit_utilization: f.credit_utilization,
            num_late_payments: f.num_late_payments,
            employment_years: f.employment_years,
            credit_score: s.credit_score,
            credit_worthy: u8::from(s.credit_worthy),
        }
    }
}

impl DatasetRecord {
    fn into_sample(self, line: u64) -> Result<ScoredSample, AppError> {
        if !(SCORE_MIN..=SCORE_MAX).contains(&self.credit_score) {
            return Err(AppError::Dataset(format!(
                "line {line}: credit_score {} outside [{SCORE_MIN}, {SCORE_MAX}]",
                self.credit_score
            )));
        }
        let worthy = match self.credit_worthy {
            0 => false,
            1 => true,
            other => {
                return Err(AppError::Dataset(format!(
                    "line {line}: credit_worthy must be 0 or 1, got {other}"
                )));
            }
        };

        let features = FeatureVector {
            age: self.age,
            income: self.income,
            debt_to_income: self.debt_to_income,
            credit_history_length: self.credit_history_length,
            num_credit_accounts: self.num_credit_accounts,
            payment_history_score: self.payment_history_score,
            credit_utilization: self.credit_utilization,
            num_late_payments: self.num_late_payments,
            employment_years: self.employment_years,
        };
        if features.to_array().iter().any(|v| !v.is_finite()) {
            return Err(AppError::Dataset(format!("line {line}: non-finite feature value")));
        }

        let sample = ScoredSample::new(features, self.credit_score);
        if sample.credit_worthy != worthy {
            return Err(AppError::Dataset(format!(
                "line {line}: credit_worthy={} disagrees with credit_score={}",
                self.credit_worthy, self.credit_score
            )));
        }
        Ok(sample)
    }
}

/// Expected header, in order.
pub fn dataset_columns() -> Vec<&'static str> {
    FEATURE_NAMES
        .iter()
        .copied()
        .chain([SCORE_COLUMN, LABEL_COLUMN])
        .collect()
}

/// Write the dataset, creating parent directories as needed.
pub fn write_dataset_csv(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Io(format!("failed to create '{}': {e}", parent.display())))?;
    }
    let file = File::create(path)
        .map_err(|e| AppError::Io(format!("failed to create dataset CSV '{}': {e}", path.display())))?;

    let mut writer = csv::Writer::from_writer(file);
    for sample in &dataset.samples {
        writer
            .serialize(DatasetRecord::from(sample))
            .map_err(|e| AppError::Io(format!("failed to write dataset row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::Io(format!("failed to flush dataset CSV: {e}")))?;

    info!(path = %path.display(), rows = dataset.len(), "wrote dataset");
    Ok(())
}

/// Read a dataset written by [`write_dataset_csv`] (or any CSV with the same header).
pub fn read_dataset_csv(path: &Path) -> Result<Dataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::Dataset(format!("failed to open dataset CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    let headers = reader
        .headers()
        .map_err(|e| AppError::Dataset(format!("failed to read dataset CSV header: {e}")))?
        .clone();
    check_header(&headers)?;

    let mut samples = Vec::new();
    for result in reader.deserialize::<DatasetRecord>() {
        let record = result.map_err(|e| AppError::Dataset(format!("malformed dataset row: {e}")))?;
        // Header is line 1.
        let line = samples.len() as u64 + 2;
        samples.push(record.into_sample(line)?);
    }

    info!(path = %path.display(), rows = samples.len(), "read dataset");
    Ok(Dataset::new(samples))
}

fn check_header(headers: &csv::StringRecord) -> Result<(), AppError> {
    let expected = dataset_columns();
    for (i, want) in expected.iter().enumerate() {
        // Spreadsheet exports sometimes prefix the first header with a BOM.
        let have = headers.get(i).map(|h| h.trim_start_matches('\u{feff}'));
        match have {
            Some(h) if h == *want => {}
            Some(h) => {
                return Err(AppError::Validation(format!(
                    "dataset column {} is `{h}`, expected `{want}`",
                    i + 1
                )));
            }
            None => {
                return Err(AppError::Validation(format!("dataset is missing column `{want}`")));
            }
        }
    }
    if headers.len() > expected.len() {
        return Err(AppError::Validation(format!(
            "dataset has unexpected extra column `{}`",
            &headers[expected.len()]
        )));
    }
    Ok(())
}
