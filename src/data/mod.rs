//! Synthetic dataset generation.

pub mod sample;

pub use sample::{compute_stats, credit_score, generate_dataset};
