//! Model dispatch and the servable artifact.
//!
//! Training and inference rely on two primitive operations:
//! - fit a classifier of a given kind on a feature matrix
//! - predict the positive-class probability for one row
//!
//! These are dispatched here for each model kind, so the harness and the
//! inference service never branch on a family themselves.

use serde::{Deserialize, Serialize};

use crate::domain::{ModelKind, PredictionResult, TrainConfig};
use crate::error::AppError;
use crate::models::forest::{ForestParams, RandomForest};
use crate::models::logistic::{LogisticParams, LogisticRegression};
use crate::models::scaler::StandardScaler;
use crate::models::tree::{DecisionTree, TreeParams};

/// A fitted classifier of any supported family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classifier {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
    DecisionTree(DecisionTree),
}

impl Classifier {
    pub fn kind(&self) -> ModelKind {
        match self {
            Classifier::RandomForest(_) => ModelKind::RandomForest,
            Classifier::LogisticRegression(_) => ModelKind::LogisticRegression,
            Classifier::DecisionTree(_) => ModelKind::DecisionTree,
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Classifier::RandomForest(m) => m.n_features(),
            Classifier::LogisticRegression(m) => m.n_features(),
            Classifier::DecisionTree(m) => m.n_features(),
        }
    }

    /// Positive-class probability for a row in the model's input space.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        match self {
            Classifier::RandomForest(m) => m.predict_proba(row),
            Classifier::LogisticRegression(m) => m.predict_proba(row),
            Classifier::DecisionTree(m) => m.predict_proba(row),
        }
    }

    /// Hard label: the more probable class (ties go to not-worthy).
    pub fn predict(&self, row: &[f64]) -> bool {
        PredictionResult::from_probability_worthy(self.predict_proba(row)).credit_worthy
    }

    pub fn is_well_formed(&self) -> bool {
        match self {
            Classifier::RandomForest(m) => m.is_well_formed(),
            Classifier::LogisticRegression(m) => m.is_well_formed(),
            Classifier::DecisionTree(m) => m.is_well_formed(),
        }
    }
}

/// Fit a classifier of `kind`. Callers pass standardized rows for scale-sensitive kinds.
pub fn train(kind: ModelKind, x: &[Vec<f64>], y: &[bool], config: &TrainConfig) -> Result<Classifier, AppError> {
    match kind {
        ModelKind::RandomForest => {
            let params = ForestParams {
                n_trees: config.forest_trees,
                max_depth: config.forest_max_depth,
                min_samples_split: config.min_samples_split,
                seed: config.seed,
            };
            Ok(Classifier::RandomForest(RandomForest::fit(x, y, &params)?))
        }
        ModelKind::LogisticRegression => {
            let params = LogisticParams {
                c: config.logistic_c,
                max_iter: config.logistic_max_iter,
                tol: config.logistic_tol,
            };
            Ok(Classifier::LogisticRegression(LogisticRegression::fit(x, y, &params)?))
        }
        ModelKind::DecisionTree => {
            let params = TreeParams {
                max_depth: config.tree_max_depth,
                min_samples_split: config.min_samples_split,
                max_features: None,
            };
            Ok(Classifier::DecisionTree(DecisionTree::fit(x, y, &params)?))
        }
    }
}

/// Everything inference needs: the winning model, its scaler (if any) and the
/// field order it was trained on.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifact {
    pub model: Classifier,
    pub scaler: Option<StandardScaler>,
    pub feature_order: Vec<String>,
}

impl ModelArtifact {
    /// Check the invariants that tie the three components together.
    ///
    /// Violations are reported as artifact load errors naming the component.
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.model.is_well_formed() {
            return Err(AppError::artifact("model", "parameters are malformed"));
        }

        if self.feature_order.is_empty() {
            return Err(AppError::artifact("feature_order", "is empty"));
        }
        for (i, name) in self.feature_order.iter().enumerate() {
            if self.feature_order[..i].contains(name) {
                return Err(AppError::artifact("feature_order", format!("duplicate field `{name}`")));
            }
        }
        if self.feature_order.len() != self.model.n_features() {
            return Err(AppError::artifact(
                "feature_order",
                format!(
                    "lists {} fields but the model expects {}",
                    self.feature_order.len(),
                    self.model.n_features()
                ),
            ));
        }

        let kind = self.model.kind();
        match (&self.scaler, kind.requires_scaling()) {
            (None, true) => Err(AppError::artifact(
                "scaler",
                format!("required by {} but absent", kind.display_name()),
            )),
            (Some(_), false) => Err(AppError::artifact(
                "scaler",
                format!("present but {} is trained on raw inputs", kind.display_name()),
            )),
            (Some(s), true) if !s.is_well_formed() || s.n_features() != self.feature_order.len() => {
                Err(AppError::artifact("scaler", "does not match the feature order"))
            }
            _ => Ok(()),
        }
    }

    /// Apply the stored scaler (if any) to a row already in `feature_order`.
    pub fn prepare_row(&self, row: &[f64]) -> Vec<f64> {
        match &self.scaler {
            Some(s) => s.transform_row(row),
            None => row.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FEATURE_NAMES;

    fn toy() -> (Vec<Vec<f64>>, Vec<bool>) {
        let x: Vec<Vec<f64>> = (0..60)
            .map(|i| (0..FEATURE_NAMES.len()).map(|j| ((i * (j + 3)) % 23) as f64).collect())
            .collect();
        let y = x.iter().map(|r| r[0] > 11.0).collect();
        (x, y)
    }

    fn small_config() -> TrainConfig {
        TrainConfig {
            forest_trees: 5,
            ..TrainConfig::default()
        }
    }

    fn names() -> Vec<String> {
        FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn train_dispatches_on_kind() {
        let (x, y) = toy();
        for kind in [ModelKind::RandomForest, ModelKind::LogisticRegression, ModelKind::DecisionTree] {
            let model = train(kind, &x, &y, &small_config()).unwrap();
            assert_eq!(model.kind(), kind);
            assert_eq!(model.n_features(), FEATURE_NAMES.len());
            assert!(model.is_well_formed());
        }
    }

    #[test]
    fn artifact_requires_scaler_only_for_scale_sensitive_models() {
        let (x, y) = toy();
        let scaler = StandardScaler::fit(&x).unwrap();
        let tree = train(ModelKind::DecisionTree, &x, &y, &small_config()).unwrap();
        let linear = train(ModelKind::LogisticRegression, &scaler.transform(&x), &y, &small_config()).unwrap();

        let ok_tree = ModelArtifact {
            model: tree.clone(),
            scaler: None,
            feature_order: names(),
        };
        assert!(ok_tree.validate().is_ok());

        let tree_with_scaler = ModelArtifact {
            scaler: Some(scaler.clone()),
            ..ok_tree
        };
        assert!(matches!(
            tree_with_scaler.validate(),
            Err(AppError::ArtifactLoad { component, .. }) if component == "scaler"
        ));

        let linear_without_scaler = ModelArtifact {
            model: linear.clone(),
            scaler: None,
            feature_order: names(),
        };
        assert!(matches!(
            linear_without_scaler.validate(),
            Err(AppError::ArtifactLoad { component, .. }) if component == "scaler"
        ));

        let ok_linear = ModelArtifact {
            model: linear,
            scaler: Some(scaler),
            feature_order: names(),
        };
        assert!(ok_linear.validate().is_ok());
    }

    #[test]
    fn feature_order_must_match_model_width() {
        let (x, y) = toy();
        let tree = train(ModelKind::DecisionTree, &x, &y, &small_config()).unwrap();
        let mut order = names();
        order.pop();
        let artifact = ModelArtifact {
            model: tree,
            scaler: None,
            feature_order: order,
        };
        assert!(matches!(
            artifact.validate(),
            Err(AppError::ArtifactLoad { component, .. }) if component == "feature_order"
        ));
    }
}
