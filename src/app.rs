//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads an optional `.env` and installs logging
//! - parses CLI arguments
//! - dispatches to generation, training, inference or inspection
//! - prints reports (stdout) while logs go to stderr

use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command, GenerateArgs, InspectArgs, PredictArgs, TrainArgs};
use crate::domain::{FeatureVector, GeneratorConfig, TrainConfig};
use crate::error::AppError;
use crate::inference::CreditScorer;

pub mod pipeline;

/// Entry point for the `credit` binary.
pub fn run() -> Result<(), AppError> {
    // Paths may come from a local `.env`; a missing file is fine.
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => handle_generate(args),
        Command::Train(args) => handle_train(args),
        Command::Predict(args) => handle_predict(args),
        Command::Inspect(args) => handle_inspect(args),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = GeneratorConfig {
        sample_count: args.samples,
        seed: args.seed,
    };
    let stats = pipeline::run_generate(&config, &args.output)?;
    println!("{}", crate::report::format_generation_summary(&args.output, &stats));
    Ok(())
}

fn handle_train(args: TrainArgs) -> Result<(), AppError> {
    let config = train_config_from_args(&args);
    let outcome = pipeline::run_training(&args.data, &args.artifact, &config)?;
    println!("{}", crate::report::format_training_report(&outcome, &args.artifact));
    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let scorer = CreditScorer::load(&args.artifact)?;

    match args.input {
        Some(json) => {
            let result = scorer.predict_json(&json)?;
            let out = serde_json::to_string_pretty(&result)
                .map_err(|e| AppError::Io(format!("failed to encode prediction: {e}")))?;
            println!("{out}");
        }
        None => {
            let applicant = FeatureVector::sample_applicant();
            let result = scorer.predict(&applicant)?;
            info!(worthy = result.credit_worthy, confidence = result.confidence, "scored sample applicant");
            println!(
                "{}",
                crate::report::format_prediction(&applicant, &result, scorer.model_kind())
            );
        }
    }
    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<(), AppError> {
    let dataset = crate::io::read_dataset_csv(&args.data)?;
    let stats = crate::data::compute_stats(&dataset);
    println!(
        "{}",
        crate::report::format_inspection(&args.data, &dataset, stats.as_ref(), args.head)
    );
    Ok(())
}

pub fn train_config_from_args(args: &TrainArgs) -> TrainConfig {
    TrainConfig {
        eval_fraction: args.eval_fraction,
        seed: args.seed,
        forest_trees: args.trees,
        tree_max_depth: Some(args.max_depth),
        ..TrainConfig::default()
    }
}
