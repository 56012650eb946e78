//! `credit-scorer` library crate.
//!
//! The binary (`credit`) is a thin wrapper around this library so that:
//!
//! - generation, training and inference are testable without spawning processes
//! - the inference service can be embedded by other callers
//!
//! Flow: `data` generates samples, `fit` trains and selects a model, `io`
//! persists datasets and artifacts, `inference` serves a loaded artifact.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod inference;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
