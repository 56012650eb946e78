//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced by the generator and consumed by the training harness
//! - exchanged as JSON with inference callers
//! - embedded in the persisted model artifact

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;

/// Number of fields in the feature schema.
pub const N_FEATURES: usize = 9;

/// Canonical feature order, shared by generation, training and inference.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "age",
    "income",
    "debt_to_income",
    "credit_history_length",
    "num_credit_accounts",
    "payment_history_score",
    "credit_utilization",
    "num_late_payments",
    "employment_years",
];

/// Lowest and highest attainable credit score.
pub const SCORE_MIN: u16 = 300;
pub const SCORE_MAX: u16 = 850;

/// Scores at or above this value are labelled credit-worthy.
pub const WORTHY_THRESHOLD: u16 = 650;

/// One applicant's raw financial attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub age: u32,
    pub income: f64,
    pub debt_to_income: f64,
    pub credit_history_length: u32,
    pub num_credit_accounts: u32,
    pub payment_history_score: f64,
    pub credit_utilization: f64,
    pub num_late_payments: u32,
    pub employment_years: u32,
}

impl FeatureVector {
    /// Values in `FEATURE_NAMES` order.
    pub fn to_array(&self) -> [f64; N_FEATURES] {
        [
            f64::from(self.age),
            self.income,
            self.debt_to_income,
            f64::from(self.credit_history_length),
            f64::from(self.num_credit_accounts),
            self.payment_history_score,
            self.credit_utilization,
            f64::from(self.num_late_payments),
            f64::from(self.employment_years),
        ]
    }

    /// Look up a field by its schema name.
    pub fn value(&self, name: &str) -> Option<f64> {
        let idx = FEATURE_NAMES.iter().position(|&n| n == name)?;
        Some(self.to_array()[idx])
    }

    /// JSON object keyed by schema name (the wire shape accepted by inference).
    pub fn to_mapping(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// The applicant used by `credit predict` when no input is given.
    pub fn sample_applicant() -> Self {
        Self {
            age: 35,
            income: 65000.0,
            debt_to_income: 0.3,
            credit_history_length: 10,
            num_credit_accounts: 5,
            payment_history_score: 0.85,
            credit_utilization: 0.25,
            num_late_payments: 1,
            employment_years: 8,
        }
    }
}

/// A generated applicant plus its derived score and label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredSample {
    pub features: FeatureVector,
    pub credit_score: u16,
    pub credit_worthy: bool,
}

impl ScoredSample {
    /// Build a sample, deriving the label from the score.
    pub fn new(features: FeatureVector, credit_score: u16) -> Self {
        Self {
            features,
            credit_score,
            credit_worthy: credit_score >= WORTHY_THRESHOLD,
        }
    }
}

/// Ordered collection of samples used for training.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub samples: Vec<ScoredSample>,
}

impl Dataset {
    pub fn new(samples: Vec<ScoredSample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Feature rows in schema order.
    pub fn feature_rows(&self) -> Vec<Vec<f64>> {
        self.samples
            .iter()
            .map(|s| s.features.to_array().to_vec())
            .collect()
    }

    pub fn labels(&self) -> Vec<bool> {
        self.samples.iter().map(|s| s.credit_worthy).collect()
    }

    /// `(not_worthy, worthy)` counts.
    pub fn label_counts(&self) -> (usize, usize) {
        let worthy = self.samples.iter().filter(|s| s.credit_worthy).count();
        (self.samples.len() - worthy, worthy)
    }
}

/// Summary stats about a dataset (for reports).
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub n_samples: usize,
    pub n_worthy: usize,
    pub n_not_worthy: usize,
    pub score_min: u16,
    pub score_max: u16,
    pub score_mean: f64,
}

impl DatasetStats {
    pub fn worthy_fraction(&self) -> f64 {
        if self.n_samples == 0 {
            return 0.0;
        }
        self.n_worthy as f64 / self.n_samples as f64
    }
}

/// The outcome of scoring one applicant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub credit_worthy: bool,
    pub confidence: f64,
    pub probability_not_worthy: f64,
    pub probability_worthy: f64,
}

impl PredictionResult {
    /// Build a result from a positive-class probability.
    ///
    /// The negative-class probability is its complement, so the pair always sums
    /// to one; the decision is the more probable class (ties go to not-worthy).
    pub fn from_probability_worthy(p_worthy: f64) -> Self {
        let probability_worthy = p_worthy.clamp(0.0, 1.0);
        let probability_not_worthy = 1.0 - probability_worthy;
        Self {
            credit_worthy: probability_worthy > probability_not_worthy,
            confidence: probability_worthy.max(probability_not_worthy),
            probability_not_worthy,
            probability_worthy,
        }
    }
}

/// Concrete classifier family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    RandomForest,
    LogisticRegression,
    DecisionTree,
}

impl ModelKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::RandomForest => "Random Forest",
            ModelKind::LogisticRegression => "Logistic Regression",
            ModelKind::DecisionTree => "Decision Tree",
        }
    }

    /// Whether the family must be trained and served on standardized inputs.
    pub fn requires_scaling(self) -> bool {
        match self {
            ModelKind::RandomForest | ModelKind::DecisionTree => false,
            ModelKind::LogisticRegression => true,
        }
    }
}

/// Settings for synthetic dataset generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub sample_count: usize,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sample_count: 5000,
            seed: 42,
        }
    }
}

/// Settings for the training and selection harness.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    /// Fraction of each class held out for evaluation.
    pub eval_fraction: f64,
    /// Seed for the split and for forest bootstrapping.
    pub seed: u64,
    pub forest_trees: usize,
    /// `None` grows forest trees until leaves are pure.
    pub forest_max_depth: Option<usize>,
    pub tree_max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Inverse L2 regularisation strength for logistic regression.
    pub logistic_c: f64,
    pub logistic_max_iter: usize,
    pub logistic_tol: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            eval_fraction: 0.2,
            seed: 42,
            forest_trees: 100,
            forest_max_depth: None,
            tree_max_depth: Some(10),
            min_samples_split: 2,
            logistic_c: 1.0,
            logistic_max_iter: 100,
            logistic_tol: 1e-8,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.eval_fraction.is_finite() && self.eval_fraction > 0.0 && self.eval_fraction < 1.0) {
            return Err(AppError::Configuration(format!(
                "eval fraction must be in (0, 1), got {}",
                self.eval_fraction
            )));
        }
        if self.forest_trees == 0 {
            return Err(AppError::Configuration("forest needs at least one tree".to_string()));
        }
        if self.min_samples_split < 2 {
            return Err(AppError::Configuration("min_samples_split must be >= 2".to_string()));
        }
        if matches!(self.tree_max_depth, Some(0)) || matches!(self.forest_max_depth, Some(0)) {
            return Err(AppError::Configuration("max depth must be >= 1".to_string()));
        }
        if !(self.logistic_c.is_finite() && self.logistic_c > 0.0) {
            return Err(AppError::Configuration(format!(
                "logistic C must be finite and > 0, got {}",
                self.logistic_c
            )));
        }
        if self.logistic_max_iter == 0 || !(self.logistic_tol.is_finite() && self.logistic_tol > 0.0) {
            return Err(AppError::Configuration(
                "logistic solver needs max_iter >= 1 and a positive tolerance".to_string(),
            ));
        }
        Ok(())
    }
}
