//! CART decision tree (Gini impurity, binary labels).
//!
//! The tree is stored as a flat node list so it serializes compactly and can be
//! evaluated without recursion. Node 0 is the root.
//!
//! Splits are axis-aligned: a row goes left when `row[feature] <= threshold`.
//! Thresholds sit halfway between adjacent distinct training values.

use rand::rngs::StdRng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::math::gini;

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Number of randomly chosen features examined per split (`None` = all).
    pub max_features: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// Training class counts `[not_worthy, worthy]` that reached this leaf.
    Leaf { counts: [u32; 2] },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    n_features: usize,
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Fit on every row.
    pub fn fit(x: &[Vec<f64>], y: &[bool], params: &TreeParams) -> Result<Self, AppError> {
        let indices: Vec<usize> = (0..x.len()).collect();
        Self::fit_on(x, y, indices, params, None)
    }

    /// Fit on a (possibly repeating) subset of rows; `rng` drives feature sampling.
    pub fn fit_on(
        x: &[Vec<f64>],
        y: &[bool],
        indices: Vec<usize>,
        params: &TreeParams,
        rng: Option<&mut StdRng>,
    ) -> Result<Self, AppError> {
        let n_features = check_training_matrix(x, y)?;
        if indices.is_empty() {
            return Err(AppError::Configuration("cannot grow a tree from zero rows".to_string()));
        }

        let mut builder = Builder {
            x,
            y,
            params,
            n_features,
            nodes: Vec::new(),
            rng,
        };
        builder.grow(indices, 0);

        Ok(Self {
            n_features,
            nodes: builder.nodes,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest leaf (a lone root leaf has depth 0).
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((id, d)) = stack.pop() {
            match self.nodes.get(id) {
                Some(Node::Split { left, right, .. }) => {
                    stack.push((*left, d + 1));
                    stack.push((*right, d + 1));
                }
                Some(Node::Leaf { .. }) => max_depth = max_depth.max(d),
                None => {}
            }
        }
        max_depth
    }

    /// Probability of the positive class: its share among training rows in the leaf.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes.get(id) {
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let v = row.get(*feature).copied().unwrap_or(f64::NAN);
                    id = if v <= *threshold { *left } else { *right };
                }
                Some(Node::Leaf { counts }) => {
                    let total = counts[0] + counts[1];
                    if total == 0 {
                        return 0.0;
                    }
                    return f64::from(counts[1]) / f64::from(total);
                }
                None => return 0.0,
            }
        }
    }

    /// Structural check used when loading a persisted tree.
    pub fn is_well_formed(&self) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        self.nodes.iter().enumerate().all(|(id, node)| match node {
            Node::Leaf { counts } => counts[0] + counts[1] > 0,
            // Children are always allocated after their parent, which also rules out cycles.
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                *feature < self.n_features
                    && threshold.is_finite()
                    && *left > id
                    && *right > id
                    && *left < self.nodes.len()
                    && *right < self.nodes.len()
            }
        })
    }
}

/// Validate a training matrix and return its width.
pub(crate) fn check_training_matrix(x: &[Vec<f64>], y: &[bool]) -> Result<usize, AppError> {
    if x.len() != y.len() {
        return Err(AppError::Validation(format!(
            "feature rows ({}) and labels ({}) differ in length",
            x.len(),
            y.len()
        )));
    }
    let width = x.first().map(Vec::len).unwrap_or(0);
    if width == 0 {
        return Err(AppError::Configuration("training matrix has no rows or no columns".to_string()));
    }
    if x.iter().any(|r| r.len() != width) {
        return Err(AppError::Validation("training rows have inconsistent widths".to_string()));
    }
    if x.iter().flatten().any(|v| !v.is_finite()) {
        return Err(AppError::Validation("training matrix contains non-finite values".to_string()));
    }
    Ok(width)
}

struct Builder<'a, 'r> {
    x: &'a [Vec<f64>],
    y: &'a [bool],
    params: &'a TreeParams,
    n_features: usize,
    nodes: Vec<Node>,
    rng: Option<&'r mut StdRng>,
}

#[derive(Debug, Clone, Copy)]
struct SplitChoice {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl Builder<'_, '_> {
    fn grow(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let counts = self.class_counts(&indices);
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            counts: [counts[0] as u32, counts[1] as u32],
        });

        let pure = counts[0] == 0 || counts[1] == 0;
        let too_small = indices.len() < self.params.min_samples_split;
        let too_deep = self.params.max_depth.is_some_and(|d| depth >= d);
        if pure || too_small || too_deep {
            return id;
        }

        let Some(split) = self.best_split(&indices, counts) else {
            return id;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.x[i][split.feature] <= split.threshold);

        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    fn class_counts(&self, indices: &[usize]) -> [usize; 2] {
        let worthy = indices.iter().filter(|&&i| self.y[i]).count();
        [indices.len() - worthy, worthy]
    }

    fn candidate_features(&mut self) -> Vec<usize> {
        match (self.params.max_features, self.rng.as_deref_mut()) {
            (Some(k), Some(rng)) if k < self.n_features => {
                index::sample(rng, self.n_features, k.max(1)).into_vec()
            }
            _ => (0..self.n_features).collect(),
        }
    }

    /// Lowest weighted child impurity over the candidate features, if it improves on the parent.
    fn best_split(&mut self, indices: &[usize], counts: [usize; 2]) -> Option<SplitChoice> {
        let n = indices.len() as f64;
        let parent = gini(counts);
        let mut best: Option<SplitChoice> = None;

        for feature in self.candidate_features() {
            let mut sorted = indices.to_vec();
            sorted.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let mut left = [0usize; 2];
            for k in 0..sorted.len() - 1 {
                left[usize::from(self.y[sorted[k]])] += 1;

                let lo = self.x[sorted[k]][feature];
                let hi = self.x[sorted[k + 1]][feature];
                if lo >= hi {
                    continue;
                }

                let right = [counts[0] - left[0], counts[1] - left[1]];
                let n_left = (k + 1) as f64;
                let impurity = (n_left * gini(left) + (n - n_left) * gini(right)) / n;

                if best.is_none_or(|b| impurity < b.impurity) {
                    let mid = lo + (hi - lo) / 2.0;
                    // Keep `lo <= threshold < hi` even when the midpoint rounds up.
                    let threshold = if mid < hi { mid } else { lo };
                    best = Some(SplitChoice {
                        feature,
                        threshold,
                        impurity,
                    });
                }
            }
        }

        best.filter(|b| b.impurity < parent)
    }
}
