//! Held-out evaluation metrics.
//!
//! Confusion-matrix metrics come from hard labels; ROC-AUC comes from the
//! positive-class probabilities (rank statistic, ties share their mean rank).

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: f64,
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_count: usize,
}

/// Compute all metrics. Positive class = credit-worthy.
///
/// Fails when the inputs differ in length or contain a single class (AUC is undefined).
pub fn compute_metrics(
    predictions: &[bool],
    labels: &[bool],
    scores: &[f64],
) -> Result<ClassificationMetrics, AppError> {
    if predictions.len() != labels.len() || scores.len() != labels.len() {
        return Err(AppError::Validation(format!(
            "metric inputs differ in length: predictions={}, labels={}, scores={}",
            predictions.len(),
            labels.len(),
            scores.len()
        )));
    }

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut tn = 0usize;
    let mut fn_count = 0usize;
    for (&pred, &label) in predictions.iter().zip(labels) {
        match (pred, label) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            (false, false) => tn += 1,
            (false, true) => fn_count += 1,
        }
    }

    let total = labels.len();
    let accuracy = ratio(tp + tn, total);
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_count);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    let roc_auc = roc_auc(labels, scores).ok_or_else(|| {
        AppError::Configuration("ROC-AUC is undefined when the evaluation set has one class".to_string())
    })?;

    Ok(ClassificationMetrics {
        accuracy,
        precision,
        recall,
        f1,
        roc_auc,
        tp,
        fp,
        tn,
        fn_count,
    })
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Mann–Whitney estimate of ROC-AUC. `None` unless both classes are present.
pub fn roc_auc(labels: &[bool], scores: &[f64]) -> Option<f64> {
    let n_pos = labels.iter().filter(|&&l| l).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 || labels.len() != scores.len() {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // 1-based ranks, averaged across tied scores.
    let mut pos_rank_sum = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let mean_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            if labels[idx] {
                pos_rank_sum += mean_rank;
            }
        }
        i = j + 1;
    }

    let n_pos_f = n_pos as f64;
    Some((pos_rank_sum - n_pos_f * (n_pos_f + 1.0) / 2.0) / (n_pos_f * n_neg as f64))
}

/// Accuracy of always predicting the majority class.
pub fn majority_baseline_accuracy(labels: &[bool]) -> f64 {
    let pos = labels.iter().filter(|&&l| l).count();
    ratio(pos.max(labels.len() - pos), labels.len())
}

impl std::fmt::Display for ClassificationMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "acc={:.4} prec={:.4} rec={:.4} f1={:.4} auc={:.4} (tp={} fp={} tn={} fn={})",
            self.accuracy,
            self.precision,
            self.recall,
            self.f1,
            self.roc_auc,
            self.tp,
            self.fp,
            self.tn,
            self.fn_count,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let labels = [false, false, true, true];
        let m = compute_metrics(&labels, &labels, &[0.1, 0.2, 0.8, 0.9]).unwrap();
        assert!((m.accuracy - 1.0).abs() < 1e-9);
        assert!((m.precision - 1.0).abs() < 1e-9);
        assert!((m.recall - 1.0).abs() < 1e-9);
        assert!((m.f1 - 1.0).abs() < 1e-9);
        assert!((m.roc_auc - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mixed() {
        // 3 TP, 1 FP, 2 TN, 1 FN
        let preds = [true, true, true, true, false, false, false];
        let labels = [true, true, true, false, false, false, true];
        let scores = [0.9, 0.8, 0.7, 0.6, 0.4, 0.3, 0.2];
        let m = compute_metrics(&preds, &labels, &scores).unwrap();
        assert_eq!((m.tp, m.fp, m.tn, m.fn_count), (3, 1, 2, 1));
        assert!((m.accuracy - 5.0 / 7.0).abs() < 1e-9);
        assert!((m.precision - 0.75).abs() < 1e-9);
        assert!((m.recall - 0.75).abs() < 1e-9);
        assert!((m.f1 - 0.75).abs() < 1e-9);
        // Positive ranks: 7, 6, 5, 1 -> (19 - 10) / 12.
        assert!((m.roc_auc - 9.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn auc_uses_scores_not_labels() {
        let labels = [false, true, false, true];
        let a = roc_auc(&labels, &[0.1, 0.9, 0.2, 0.8]).unwrap();
        let b = roc_auc(&labels, &[0.9, 0.1, 0.8, 0.2]).unwrap();
        assert!((a - 1.0).abs() < 1e-12);
        assert!(b.abs() < 1e-12);
    }

    #[test]
    fn tied_scores_count_half() {
        let auc = roc_auc(&[false, true], &[0.5, 0.5]).unwrap();
        assert!((auc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn single_class_is_rejected() {
        let err = compute_metrics(&[true, true], &[true, true], &[0.7, 0.8]).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(roc_auc(&[], &[]).is_none());
    }

    #[test]
    fn no_positive_predictions_gives_zero_f1() {
        let m = compute_metrics(&[false, false], &[false, true], &[0.2, 0.4]).unwrap();
        assert_eq!(m.f1, 0.0);
        assert_eq!(m.precision, 0.0);
    }

    #[test]
    fn baseline_is_majority_share() {
        assert!((majority_baseline_accuracy(&[true, true, false]) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(majority_baseline_accuracy(&[]), 0.0);
    }
}
