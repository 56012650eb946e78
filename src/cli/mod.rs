//! Command-line parsing for the credit scorer.
//!
//! Argument parsing and command dispatch are kept separate from the
//! generation, training and inference code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_DATA_PATH: &str = "data/credit_data.csv";
pub const DEFAULT_ARTIFACT_PATH: &str = "models/credit_model.json";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "credit", version, about = "Synthetic credit-worthiness scoring")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a synthetic labelled dataset and write it as CSV.
    Generate(GenerateArgs),
    /// Train the candidate models, select the best by F1 and write the artifact.
    Train(TrainArgs),
    /// Score an applicant with a trained artifact.
    ///
    /// With a JSON object argument the result is printed as JSON; without one
    /// a built-in sample applicant is scored and summarized.
    Predict(PredictArgs),
    /// Print shape, label balance and the first rows of a dataset CSV.
    Inspect(InspectArgs),
}

#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Number of samples to generate.
    #[arg(short = 'n', long, default_value_t = 5000)]
    pub samples: usize,

    /// Random seed; the same seed always produces the same file.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV path.
    #[arg(short, long, env = "CREDIT_DATA_PATH", default_value = DEFAULT_DATA_PATH)]
    pub output: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct TrainArgs {
    /// Dataset CSV produced by `credit generate`.
    #[arg(long, env = "CREDIT_DATA_PATH", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Where to write the model artifact.
    #[arg(long, env = "CREDIT_ARTIFACT_PATH", default_value = DEFAULT_ARTIFACT_PATH)]
    pub artifact: PathBuf,

    /// Fraction of each class held out for evaluation.
    #[arg(long, default_value_t = 0.2)]
    pub eval_fraction: f64,

    /// Seed for the split and the forest.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of trees in the random forest.
    #[arg(long, default_value_t = 100)]
    pub trees: usize,

    /// Maximum depth of the single decision tree.
    #[arg(long, default_value_t = 10)]
    pub max_depth: usize,
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// Applicant as a JSON object keyed by feature name.
    #[arg(value_name = "JSON")]
    pub input: Option<String>,

    /// Model artifact written by `credit train`.
    #[arg(long, env = "CREDIT_ARTIFACT_PATH", default_value = DEFAULT_ARTIFACT_PATH)]
    pub artifact: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct InspectArgs {
    /// Dataset CSV to inspect.
    #[arg(long, env = "CREDIT_DATA_PATH", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Number of leading rows to print.
    #[arg(long, default_value_t = 5)]
    pub head: usize,
}
