//! Stratified train/eval partitioning.
//!
//! Each class is shuffled with a seeded RNG and the requested fraction of it is
//! held out, so both partitions keep the dataset's class balance. Indices within
//! each partition are returned in ascending (dataset) order.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::error::AppError;

/// Row indices of the two partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub eval: Vec<usize>,
}

pub fn stratified_split(labels: &[bool], eval_fraction: f64, seed: u64) -> Result<SplitIndices, AppError> {
    if !(eval_fraction.is_finite() && eval_fraction > 0.0 && eval_fraction < 1.0) {
        return Err(AppError::Configuration(format!(
            "eval fraction must be in (0, 1), got {eval_fraction}"
        )));
    }

    let mut negatives: Vec<usize> = Vec::new();
    let mut positives: Vec<usize> = Vec::new();
    for (i, &label) in labels.iter().enumerate() {
        if label {
            positives.push(i);
        } else {
            negatives.push(i);
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    negatives.shuffle(&mut rng);
    positives.shuffle(&mut rng);

    let eval_neg = (negatives.len() as f64 * eval_fraction).round() as usize;
    let eval_pos = (positives.len() as f64 * eval_fraction).round() as usize;

    let mut eval: Vec<usize> = negatives[..eval_neg]
        .iter()
        .chain(&positives[..eval_pos])
        .copied()
        .collect();
    let mut train: Vec<usize> = negatives[eval_neg..]
        .iter()
        .chain(&positives[eval_pos..])
        .copied()
        .collect();
    eval.sort_unstable();
    train.sort_unstable();

    Ok(SplitIndices { train, eval })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(neg: usize, pos: usize) -> Vec<bool> {
        (0..neg + pos).map(|i| i >= neg).collect()
    }

    #[test]
    fn preserves_class_ratio() {
        let y = labels(800, 200);
        let split = stratified_split(&y, 0.2, 42).unwrap();

        assert_eq!(split.eval.len(), 200);
        assert_eq!(split.train.len(), 800);
        let eval_pos = split.eval.iter().filter(|&&i| y[i]).count();
        let train_pos = split.train.iter().filter(|&&i| y[i]).count();
        assert_eq!(eval_pos, 40);
        assert_eq!(train_pos, 160);
    }

    #[test]
    fn partitions_are_disjoint_and_cover_everything() {
        let y = labels(37, 21);
        let split = stratified_split(&y, 0.3, 1).unwrap();
        let mut all: Vec<usize> = split.train.iter().chain(&split.eval).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..y.len()).collect::<Vec<_>>());
    }

    #[test]
    fn deterministic_for_seed() {
        let y = labels(50, 50);
        assert_eq!(stratified_split(&y, 0.2, 5).unwrap(), stratified_split(&y, 0.2, 5).unwrap());
        assert_ne!(stratified_split(&y, 0.2, 5).unwrap(), stratified_split(&y, 0.2, 6).unwrap());
    }

    #[test]
    fn rejects_out_of_range_fraction() {
        let y = labels(5, 5);
        for f in [0.0, 1.0, -0.1, f64::NAN] {
            assert!(matches!(stratified_split(&y, f, 0), Err(AppError::Configuration(_))));
        }
    }
}
