//! Train and evaluate a single candidate.
//!
//! Given:
//! - the raw and standardized training / evaluation matrices
//! - a candidate (model family + capability tags)
//!
//! we fit the candidate on the matrix its `requires_scaling` tag asks for,
//! score the evaluation rows and compute held-out metrics.

use tracing::info;

use crate::domain::{FEATURE_NAMES, ModelKind, TrainConfig};
use crate::error::AppError;
use crate::fit::metrics::{ClassificationMetrics, compute_metrics};
use crate::models::{Classifier, train};

/// A model family entered into selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: ModelKind,
    /// Train and serve on standardized inputs.
    pub requires_scaling: bool,
    /// Field names (in order) the candidate is trained on.
    pub required_features: Vec<String>,
}

impl Candidate {
    pub fn new(kind: ModelKind) -> Self {
        Self {
            kind,
            requires_scaling: kind.requires_scaling(),
            required_features: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The default roster, in tie-break order.
    pub fn defaults() -> Vec<Candidate> {
        vec![
            Candidate::new(ModelKind::RandomForest),
            Candidate::new(ModelKind::LogisticRegression),
            Candidate::new(ModelKind::DecisionTree),
        ]
    }

    /// Reject candidates whose inputs differ from the schema or whose tags contradict the family.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.required_features.len() != FEATURE_NAMES.len()
            || self
                .required_features
                .iter()
                .zip(FEATURE_NAMES)
                .any(|(have, want)| have != want)
        {
            return Err(AppError::Validation(format!(
                "{} requires features [{}], schema is [{}]",
                self.kind.display_name(),
                self.required_features.join(", "),
                FEATURE_NAMES.join(", ")
            )));
        }
        if self.requires_scaling != self.kind.requires_scaling() {
            return Err(AppError::Validation(format!(
                "{} is tagged requires_scaling={} but the family needs {}",
                self.kind.display_name(),
                self.requires_scaling,
                self.kind.requires_scaling()
            )));
        }
        Ok(())
    }
}

/// Training/evaluation matrices shared read-only by every candidate.
#[derive(Debug, Clone)]
pub struct Partitions {
    pub train_raw: Vec<Vec<f64>>,
    pub train_scaled: Vec<Vec<f64>>,
    pub train_labels: Vec<bool>,
    pub eval_raw: Vec<Vec<f64>>,
    pub eval_scaled: Vec<Vec<f64>>,
    pub eval_labels: Vec<bool>,
}

/// Outcome of one candidate's train + evaluate cycle.
#[derive(Debug, Clone)]
pub struct CandidateResult {
    pub kind: ModelKind,
    pub requires_scaling: bool,
    pub model: Classifier,
    pub metrics: ClassificationMetrics,
    /// Hard labels on the evaluation rows, in partition order.
    pub eval_predictions: Vec<bool>,
    /// Positive-class probabilities on the evaluation rows.
    pub eval_scores: Vec<f64>,
}

pub fn evaluate_candidate(
    candidate: &Candidate,
    parts: &Partitions,
    config: &TrainConfig,
) -> Result<CandidateResult, AppError> {
    candidate.validate()?;

    let (train_x, eval_x) = if candidate.requires_scaling {
        (&parts.train_scaled, &parts.eval_scaled)
    } else {
        (&parts.train_raw, &parts.eval_raw)
    };

    let model = train(candidate.kind, train_x, &parts.train_labels, config)?;
    if model.n_features() != candidate.required_features.len() {
        return Err(AppError::Validation(format!(
            "{} was fitted on {} features, expected {}",
            candidate.kind.display_name(),
            model.n_features(),
            candidate.required_features.len()
        )));
    }

    let eval_scores: Vec<f64> = eval_x.iter().map(|r| model.predict_proba(r)).collect();
    let eval_predictions: Vec<bool> = eval_x.iter().map(|r| model.predict(r)).collect();
    let metrics = compute_metrics(&eval_predictions, &parts.eval_labels, &eval_scores)?;

    info!(
        model = candidate.kind.display_name(),
        accuracy = metrics.accuracy,
        precision = metrics.precision,
        recall = metrics.recall,
        f1 = metrics.f1,
        roc_auc = metrics.roc_auc,
        "evaluated candidate"
    );

    Ok(CandidateResult {
        kind: candidate.kind,
        requires_scaling: candidate.requires_scaling,
        model,
        metrics,
        eval_predictions,
        eval_scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_ordered() {
        let roster = Candidate::defaults();
        let kinds: Vec<ModelKind> = roster.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![ModelKind::RandomForest, ModelKind::LogisticRegression, ModelKind::DecisionTree]
        );
        assert!(roster.iter().all(|c| c.validate().is_ok()));
        assert_eq!(
            roster.iter().filter(|c| c.requires_scaling).count(),
            1,
            "only the linear model is scale-sensitive"
        );
    }

    #[test]
    fn feature_mismatch_is_a_validation_error() {
        let mut c = Candidate::new(ModelKind::DecisionTree);
        c.required_features.swap(0, 1);
        assert!(matches!(c.validate(), Err(AppError::Validation(_))));

        let mut c = Candidate::new(ModelKind::DecisionTree);
        c.required_features.push("zip_code".to_string());
        assert!(matches!(c.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn contradictory_scaling_tag_is_rejected() {
        let mut c = Candidate::new(ModelKind::LogisticRegression);
        c.requires_scaling = false;
        assert!(matches!(c.validate(), Err(AppError::Validation(_))));
    }
}
