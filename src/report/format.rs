//! Formatted terminal output for the `credit` subcommands.
//!
//! Formatting lives in one place so the training and inference code stays
//! free of presentation concerns and output changes stay localized.

use std::path::Path;

use crate::domain::{Dataset, DatasetStats, FEATURE_NAMES, FeatureVector, ModelKind, PredictionResult};
use crate::fit::TrainingOutcome;

/// Summary printed after `credit generate`.
pub fn format_generation_summary(path: &Path, stats: &DatasetStats) -> String {
    let mut out = String::new();

    out.push_str("=== credit - Synthetic Dataset ===\n");
    out.push_str(&format!("Wrote {} samples to {}\n", stats.n_samples, path.display()));
    out.push_str(&format_label_counts(stats));
    out.push_str(&format!(
        "Credit score: min={} max={} mean={:.1}\n",
        stats.score_min, stats.score_max, stats.score_mean
    ));

    out
}

/// Per-candidate metrics table plus the selection outcome.
pub fn format_training_report(outcome: &TrainingOutcome, artifact_path: &Path) -> String {
    let mut out = String::new();

    out.push_str("=== credit - Model Training ===\n");
    out.push_str(&format!(
        "Split: train={} eval={} (stratified)\n",
        outcome.split.train.len(),
        outcome.split.eval.len()
    ));

    out.push_str("\nCandidates (held-out):\n");
    out.push_str(
        format!(
            "  {:<20} {:>6} {:>8} {:>9} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6}\n",
            "model", "scaled", "accuracy", "precision", "recall", "f1", "auc", "tp", "fp", "fn"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "  {:-<20} {:-<6} {:-<8} {:-<9} {:-<6} {:-<6} {:-<6} {:-<6} {:-<6} {:-<6}\n",
            "", "", "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for (i, r) in outcome.results.iter().enumerate() {
        let chosen = if i == outcome.best { "*" } else { " " };
        let m = &r.metrics;
        out.push_str(&format!(
            "{chosen} {:<20} {:>6} {:>8.4} {:>9.4} {:>6.4} {:>6.4} {:>6.4} {:>6} {:>6} {:>6}\n",
            r.kind.display_name(),
            if r.requires_scaling { "yes" } else { "no" },
            m.accuracy,
            m.precision,
            m.recall,
            m.f1,
            m.roc_auc,
            m.tp,
            m.fp,
            m.fn_count,
        ));
    }

    let best = outcome.best_result();
    out.push_str(&format!(
        "\nMajority-class baseline accuracy: {:.4}\n",
        outcome.baseline_accuracy
    ));
    out.push_str("\nSelected model (highest F1):\n");
    out.push_str(&format!("- {} (f1={:.4})\n", best.kind.display_name(), best.metrics.f1));
    out.push_str(&format!(
        "- scaler: {}\n",
        if outcome.artifact.scaler.is_some() { "standard" } else { "none" }
    ));
    out.push_str(&format!("- artifact: {}\n", artifact_path.display()));

    out
}

/// Human-readable result for a single applicant.
pub fn format_prediction(features: &FeatureVector, result: &PredictionResult, model: ModelKind) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== credit - Prediction ({}) ===\n", model.display_name()));
    out.push_str("Applicant:\n");
    for (name, value) in FEATURE_NAMES.iter().zip(features.to_array()) {
        out.push_str(&format!("  {name:<24} {}\n", fmt_value(value)));
    }

    out.push_str(&format!(
        "\nDecision: {}\n",
        if result.credit_worthy { "CREDIT-WORTHY" } else { "NOT CREDIT-WORTHY" }
    ));
    out.push_str(&format!("Confidence: {:.1}%\n", result.confidence * 100.0));
    out.push_str(&format!(
        "P(not worthy)={:.4}  P(worthy)={:.4}\n",
        result.probability_not_worthy, result.probability_worthy
    ));

    out
}

/// Dataset shape, label balance, score range and the first `head` rows.
pub fn format_inspection(path: &Path, dataset: &Dataset, stats: Option<&DatasetStats>, head: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== credit - Dataset {} ===\n", path.display()));
    out.push_str(&format!(
        "Shape: {} rows x {} columns\n",
        dataset.len(),
        FEATURE_NAMES.len() + 2
    ));
    let Some(stats) = stats else {
        out.push_str("(empty dataset)\n");
        return out;
    };
    out.push_str(&format_label_counts(stats));
    out.push_str(&format!(
        "Credit score: min={} max={} mean={:.1}\n",
        stats.score_min, stats.score_max, stats.score_mean
    ));

    out.push_str(&format!("\nFirst {} rows:\n", head.min(dataset.len())));
    let mut header = String::new();
    for name in FEATURE_NAMES {
        header.push_str(&format!("{:>w$} ", abbreviate(name), w = COLUMN_WIDTH));
    }
    header.push_str(&format!("{:>6} {:>6}", "score", "worthy"));
    out.push_str(header.trim_end());
    out.push('\n');

    for s in dataset.samples.iter().take(head) {
        let mut line = String::new();
        for value in s.features.to_array() {
            line.push_str(&format!("{:>w$} ", fmt_value(value), w = COLUMN_WIDTH));
        }
        line.push_str(&format!("{:>6} {:>6}", s.credit_score, u8::from(s.credit_worthy)));
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

const COLUMN_WIDTH: usize = 10;

fn format_label_counts(stats: &DatasetStats) -> String {
    let pct = |n: usize| {
        if stats.n_samples == 0 {
            0.0
        } else {
            100.0 * n as f64 / stats.n_samples as f64
        }
    };
    format!(
        "Labels: worthy={} ({:.1}%) not_worthy={} ({:.1}%)\n",
        stats.n_worthy,
        pct(stats.n_worthy),
        stats.n_not_worthy,
        pct(stats.n_not_worthy)
    )
}

fn fmt_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e9 {
        format!("{v:.0}")
    } else {
        format!("{v:.3}")
    }
}

/// Shorten a column name to fit the inspection table.
fn abbreviate(name: &str) -> String {
    if name.len() <= COLUMN_WIDTH {
        return name.to_string();
    }
    let mut out: String = name.chars().take(COLUMN_WIDTH - 1).collect();
    out.push('.');
    out
}
