//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the feature schema (`FEATURE_NAMES`, `FeatureVector`)
//! - generated samples and datasets (`ScoredSample`, `Dataset`)
//! - inference outputs (`PredictionResult`)
//! - run configuration (`GeneratorConfig`, `TrainConfig`)

pub mod types;

pub use types::*;
