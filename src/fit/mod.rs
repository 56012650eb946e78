//! Training harness.
//!
//! Responsibilities:
//!
//! - stratified train/eval split
//! - train each candidate on raw or standardized inputs (parallel)
//! - held-out metrics and selection by F1

pub mod fitter;
pub mod metrics;
pub mod selection;
pub mod split;

pub use fitter::*;
pub use metrics::*;
pub use selection::*;
pub use split::*;
