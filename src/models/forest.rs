//! Random forest: bootstrap-aggregated CART trees with per-split feature sampling.
//!
//! Trees are grown in parallel. Each tree owns an RNG seeded from the forest
//! seed and its index, so the fitted forest does not depend on thread scheduling.

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::tree::{DecisionTree, TreeParams, check_training_matrix};

/// Forest growth settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit(x: &[Vec<f64>], y: &[bool], params: &ForestParams) -> Result<Self, AppError> {
        let n_features = check_training_matrix(x, y)?;
        if params.n_trees == 0 {
            return Err(AppError::Configuration("forest needs at least one tree".to_string()));
        }

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            max_features: Some(features_per_split(n_features)),
        };
        let n = x.len();

        let trees = (0..params.n_trees)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(tree_seed(params.seed, t));
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit_on(x, y, bootstrap, &tree_params, Some(&mut rng))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { n_features, trees })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Mean of the per-tree positive-class probabilities.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_proba(row)).sum();
        sum / self.trees.len() as f64
    }

    pub fn is_well_formed(&self) -> bool {
        !self.trees.is_empty()
            && self
                .trees
                .iter()
                .all(|t| t.n_features() == self.n_features && t.is_well_formed())
    }
}

/// `floor(sqrt(n_features))`, at least one.
fn features_per_split(n_features: usize) -> usize {
    ((n_features as f64).sqrt().floor() as usize).max(1)
}

fn tree_seed(seed: u64, tree: usize) -> u64 {
    seed ^ (tree as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
