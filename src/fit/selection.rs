//! Candidate training and model selection by held-out F1.
//!
//! The harness:
//! 1. Rejects datasets that cannot be split or scored (empty, single class)
//! 2. Splits stratified by label and fits one scaler on the training partition
//! 3. Trains + evaluates every candidate in parallel over read-only partitions
//! 4. Picks the highest F1; ties go to the earliest candidate in roster order
//!
//! F1 is the selection policy. AUC and recall are reported alongside it but do
//! not influence the choice.

use rayon::prelude::*;
use tracing::info;

use crate::domain::{Dataset, FEATURE_NAMES, TrainConfig};
use crate::error::AppError;
use crate::fit::fitter::{Candidate, CandidateResult, Partitions, evaluate_candidate};
use crate::fit::metrics::majority_baseline_accuracy;
use crate::fit::split::{SplitIndices, stratified_split};
use crate::models::{ModelArtifact, StandardScaler};

/// Output of training + selection.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// The servable artifact built from the winner.
    pub artifact: ModelArtifact,
    /// Every candidate, in roster order.
    pub results: Vec<CandidateResult>,
    /// Index of the winner in `results`.
    pub best: usize,
    pub split: SplitIndices,
    /// Held-out accuracy of always predicting the majority class.
    pub baseline_accuracy: f64,
}

impl TrainingOutcome {
    pub fn best_result(&self) -> &CandidateResult {
        &self.results[self.best]
    }
}

/// Train the default roster and select the best model.
pub fn train_and_select(dataset: &Dataset, config: &TrainConfig) -> Result<TrainingOutcome, AppError> {
    train_candidates(dataset, &Candidate::defaults(), config)
}

/// Train an explicit roster and select the best model.
pub fn train_candidates(
    dataset: &Dataset,
    candidates: &[Candidate],
    config: &TrainConfig,
) -> Result<TrainingOutcome, AppError> {
    config.validate()?;
    if candidates.is_empty() {
        return Err(AppError::Configuration("no candidate models to train".to_string()));
    }
    if dataset.is_empty() {
        return Err(AppError::Configuration("dataset is empty".to_string()));
    }
    let (n_neg, n_pos) = dataset.label_counts();
    if n_neg == 0 || n_pos == 0 {
        return Err(AppError::Configuration(format!(
            "dataset has a single class (not_worthy={n_neg}, worthy={n_pos}); \
             stratified split and ROC-AUC are undefined"
        )));
    }
    for c in candidates {
        c.validate()?;
    }

    let rows = dataset.feature_rows();
    let labels = dataset.labels();
    let split = stratified_split(&labels, config.eval_fraction, config.seed)?;
    ensure_both_classes(&split.train, &labels, "training")?;
    ensure_both_classes(&split.eval, &labels, "evaluation")?;
    info!(train = split.train.len(), eval = split.eval.len(), "stratified split");

    let parts = build_partitions(&rows, &labels, &split)?;
    let scaler = StandardScaler::fit(&parts.train_raw)?;
    let parts = Partitions {
        train_scaled: scaler.transform(&parts.train_raw),
        eval_scaled: scaler.transform(&parts.eval_raw),
        ..parts
    };

    let results = candidates
        .par_iter()
        .map(|c| evaluate_candidate(c, &parts, config))
        .collect::<Result<Vec<_>, _>>()?;

    let best = select_by_f1(&results);
    let winner = &results[best];
    info!(
        model = winner.kind.display_name(),
        f1 = winner.metrics.f1,
        "selected best model"
    );

    let artifact = ModelArtifact {
        model: winner.model.clone(),
        scaler: winner.requires_scaling.then(|| scaler.clone()),
        feature_order: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
    };
    artifact.validate()?;

    Ok(TrainingOutcome {
        artifact,
        baseline_accuracy: majority_baseline_accuracy(&parts.eval_labels),
        results,
        best,
        split,
    })
}

/// Index of the highest F1; the first candidate wins ties.
pub fn select_by_f1(results: &[CandidateResult]) -> usize {
    let mut best = 0;
    for (i, r) in results.iter().enumerate().skip(1) {
        if r.metrics.f1 > results[best].metrics.f1 {
            best = i;
        }
    }
    best
}

fn ensure_both_classes(indices: &[usize], labels: &[bool], partition: &str) -> Result<(), AppError> {
    let pos = indices.iter().filter(|&&i| labels[i]).count();
    if pos == 0 || pos == indices.len() {
        return Err(AppError::Configuration(format!(
            "{partition} partition ({} rows) does not contain both classes; \
             use more samples or a different eval fraction",
            indices.len()
        )));
    }
    Ok(())
}

fn build_partitions(rows: &[Vec<f64>], labels: &[bool], split: &SplitIndices) -> Result<Partitions, AppError> {
    let pick_rows = |idx: &[usize]| idx.iter().map(|&i| rows[i].clone()).collect::<Vec<_>>();
    let pick_labels = |idx: &[usize]| idx.iter().map(|&i| labels[i]).collect::<Vec<_>>();

    let parts = Partitions {
        train_raw: pick_rows(&split.train),
        train_scaled: Vec::new(),
        train_labels: pick_labels(&split.train),
        eval_raw: pick_rows(&split.eval),
        eval_scaled: Vec::new(),
        eval_labels: pick_labels(&split.eval),
    };
    if parts.train_raw.iter().chain(&parts.eval_raw).any(|r| r.len() != FEATURE_NAMES.len()) {
        return Err(AppError::Validation("feature rows do not match the schema width".to_string()));
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_dataset;
    use crate::domain::{FeatureVector, GeneratorConfig, ModelKind, ScoredSample};
    use crate::fit::metrics::ClassificationMetrics;
    use crate::models::{Classifier, DecisionTree};
    use crate::models::tree::TreeParams;

    fn fast_config() -> TrainConfig {
        TrainConfig {
            forest_trees: 10,
            ..TrainConfig::default()
        }
    }

    fn metrics_with_f1(f1: f64) -> ClassificationMetrics {
        ClassificationMetrics {
            accuracy: 0.0,
            precision: 0.0,
            recall: 0.0,
            f1,
            roc_auc: 0.5,
            tp: 0,
            fp: 0,
            tn: 0,
            fn_count: 0,
        }
    }

    fn result(kind: ModelKind, f1: f64) -> CandidateResult {
        let tree = DecisionTree::fit(
            &[vec![0.0], vec![1.0]],
            &[false, true],
            &TreeParams {
                max_depth: None,
                min_samples_split: 2,
                max_features: None,
            },
        )
        .unwrap();
        CandidateResult {
            kind,
            requires_scaling: kind.requires_scaling(),
            model: Classifier::DecisionTree(tree),
            metrics: metrics_with_f1(f1),
            eval_predictions: vec![],
            eval_scores: vec![],
        }
    }

    #[test]
    fn highest_f1_wins() {
        let results = vec![
            result(ModelKind::RandomForest, 0.80),
            result(ModelKind::LogisticRegression, 0.91),
            result(ModelKind::DecisionTree, 0.85),
        ];
        assert_eq!(select_by_f1(&results), 1);
    }

    #[test]
    fn ties_go_to_roster_order() {
        let results = vec![
            result(ModelKind::RandomForest, 0.90),
            result(ModelKind::LogisticRegression, 0.90),
            result(ModelKind::DecisionTree, 0.90),
        ];
        assert_eq!(select_by_f1(&results), 0);
    }

    #[test]
    fn empty_dataset_is_a_configuration_error() {
        let err = train_and_select(&Dataset::default(), &fast_config()).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn single_class_dataset_is_a_configuration_error() {
        let samples = (0..50)
            .map(|_| ScoredSample::new(FeatureVector::sample_applicant(), 700))
            .collect();
        let err = train_and_select(&Dataset::new(samples), &fast_config()).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn candidate_with_foreign_features_is_a_validation_error() {
        let data = generate_dataset(&GeneratorConfig {
            sample_count: 200,
            seed: 3,
        })
        .unwrap();
        let mut odd = Candidate::new(ModelKind::DecisionTree);
        odd.required_features[0] = "birth_year".to_string();

        let err = train_candidates(&data, &[odd], &fast_config()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn scaler_travels_only_with_scale_sensitive_winner() {
        let data = generate_dataset(&GeneratorConfig {
            sample_count: 600,
            seed: 42,
        })
        .unwrap();
        let outcome = train_and_select(&data, &fast_config()).unwrap();

        assert_eq!(outcome.results.len(), 3);
        let winner = outcome.best_result();
        assert_eq!(outcome.artifact.model.kind(), winner.kind);
        assert_eq!(outcome.artifact.scaler.is_some(), winner.kind.requires_scaling());
        assert_eq!(outcome.artifact.feature_order, FEATURE_NAMES.to_vec());
        assert!(outcome.results.iter().all(|r| r.metrics.f1 <= winner.metrics.f1));
    }

    #[test]
    fn single_candidate_roster_is_forced_winner() {
        let data = generate_dataset(&GeneratorConfig {
            sample_count: 400,
            seed: 5,
        })
        .unwrap();
        let outcome = train_candidates(
            &data,
            &[Candidate::new(ModelKind::LogisticRegression)],
            &fast_config(),
        )
        .unwrap();
        assert_eq!(outcome.best, 0);
        assert!(outcome.artifact.scaler.is_some());
        assert!(outcome.best_result().metrics.roc_auc > 0.8);
    }
}
