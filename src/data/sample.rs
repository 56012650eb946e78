//! Synthetic applicant generation with correlated features.
//!
//! Independent sampling of every attribute produces applicants nobody has ever
//! met (a 19 year old with 25 years of credit history, a maxed-out card next to
//! a spotless debt ratio). Two constructions keep the population realistic:
//!
//! - tenure-like fields are capped by the applicant's adult lifetime (`age - 18`)
//! - debt-to-income and credit utilization share one latent debt ratio, so they
//!   move together
//!
//! The score is a weighted linear combination of the attributes plus Gaussian
//! noise, clipped to the valid range *before* rounding.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{Beta, Normal, Poisson};
use tracing::info;

use crate::domain::{
    Dataset, DatasetStats, FeatureVector, GeneratorConfig, SCORE_MAX, SCORE_MIN, ScoredSample,
};
use crate::error::AppError;

/// Adults only; tenure fields are measured from this age.
const MIN_AGE: u32 = 18;
const MAX_AGE_EXCLUSIVE: u32 = 80;

const INCOME_MEAN: f64 = 50_000.0;
const INCOME_STD: f64 = 20_000.0;
const INCOME_MIN: f64 = 15_000.0;
const INCOME_MAX: f64 = 150_000.0;

const EMPLOYMENT_MAX_EXCLUSIVE: u32 = 40;
const HISTORY_MAX_EXCLUSIVE: u32 = 30;

/// Upper bound (exclusive) of the latent debt ratio.
const BASE_DEBT_MAX: f64 = 1.2;
const DTI_NOISE_STD: f64 = 0.1;
const DTI_MAX: f64 = 1.5;
/// Share of the latent debt ratio carried into utilization.
const UTILIZATION_LOADING: f64 = 0.7;
const UTILIZATION_NOISE_MAX: f64 = 0.3;

const ACCOUNTS_MIN: u32 = 1;
const ACCOUNTS_MAX_EXCLUSIVE: u32 = 15;

const PAYMENT_ALPHA: f64 = 3.0;
const PAYMENT_BETA: f64 = 1.5;
const LATE_PAYMENT_RATE: f64 = 1.5;

const SCORE_NOISE_STD: f64 = 20.0;

/// Draw a dataset of `config.sample_count` applicants.
///
/// Identical configs produce identical datasets.
pub fn generate_dataset(config: &GeneratorConfig) -> Result<Dataset, AppError> {
    let dists = Distributions::new()?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut samples = Vec::with_capacity(config.sample_count);
    for _ in 0..config.sample_count {
        let features = draw_features(&mut rng, &dists);
        let noise = dists.score_noise.sample(&mut rng);
        samples.push(ScoredSample::new(features, credit_score(&features, noise)));
    }

    let dataset = Dataset::new(samples);
    if let Some(stats) = compute_stats(&dataset) {
        info!(
            n = stats.n_samples,
            worthy = stats.n_worthy,
            not_worthy = stats.n_not_worthy,
            seed = config.seed,
            "generated synthetic dataset"
        );
    }
    Ok(dataset)
}

struct Distributions {
    income: Normal<f64>,
    dti_noise: Normal<f64>,
    payment: Beta<f64>,
    late: Poisson<f64>,
    score_noise: Normal<f64>,
}

impl Distributions {
    fn new() -> Result<Self, AppError> {
        let err = |what: &str, e: String| AppError::Configuration(format!("{what} distribution: {e}"));
        Ok(Self {
            income: Normal::new(INCOME_MEAN, INCOME_STD).map_err(|e| err("income", e.to_string()))?,
            dti_noise: Normal::new(0.0, DTI_NOISE_STD).map_err(|e| err("debt noise", e.to_string()))?,
            payment: Beta::new(PAYMENT_ALPHA, PAYMENT_BETA)
                .map_err(|e| err("payment history", e.to_string()))?,
            late: Poisson::new(LATE_PAYMENT_RATE).map_err(|e| err("late payments", e.to_string()))?,
            score_noise: Normal::new(0.0, SCORE_NOISE_STD)
                .map_err(|e| err("score noise", e.to_string()))?,
        })
    }
}

fn draw_features(rng: &mut StdRng, dists: &Distributions) -> FeatureVector {
    let age: u32 = rng.gen_range(MIN_AGE..MAX_AGE_EXCLUSIVE);
    let income = dists.income.sample(rng).clamp(INCOME_MIN, INCOME_MAX);

    let adult_years = age - MIN_AGE;
    let employment_years = adult_years.min(rng.gen_range(0..EMPLOYMENT_MAX_EXCLUSIVE));
    let credit_history_length = adult_years.min(rng.gen_range(0..HISTORY_MAX_EXCLUSIVE));

    let base_debt_ratio: f64 = rng.gen_range(0.0..BASE_DEBT_MAX);
    let debt_to_income = (base_debt_ratio + dists.dti_noise.sample(rng)).clamp(0.0, DTI_MAX);
    let utilization_noise: f64 = rng.gen_range(0.0..UTILIZATION_NOISE_MAX);
    let credit_utilization =
        (UTILIZATION_LOADING * base_debt_ratio + utilization_noise).clamp(0.0, 1.0);

    let num_credit_accounts = rng.gen_range(ACCOUNTS_MIN..ACCOUNTS_MAX_EXCLUSIVE);
    let payment_history_score = dists.payment.sample(rng);
    // Poisson draws are whole numbers carried as floats.
    let late: f64 = dists.late.sample(rng);
    let num_late_payments = late as u32;

    FeatureVector {
        age,
        income,
        debt_to_income,
        credit_history_length,
        num_credit_accounts,
        payment_history_score,
        credit_utilization,
        num_late_payments,
        employment_years,
    }
}

/// Score an applicant: raw linear combination, then clip, then round.
pub fn credit_score(f: &FeatureVector, noise: f64) -> u16 {
    let late_bonus = (5.0 - f64::from(f.num_late_payments)).max(0.0);
    let raw = 400.0
        + (f.income / 1000.0) * 1.5
        + (1.0 - f.debt_to_income) * 50.0
        + f64::from(f.credit_history_length) * 4.0
        + f.payment_history_score * 100.0
        + (1.0 - f.credit_utilization) * 30.0
        + late_bonus * 8.0
        + noise;

    let clipped = raw.clamp(f64::from(SCORE_MIN), f64::from(SCORE_MAX));
    clipped.round() as u16
}

/// Summarize label balance and score range. `None` for an empty dataset.
pub fn compute_stats(dataset: &Dataset) -> Option<DatasetStats> {
    let first = dataset.samples.first()?;
    let mut score_min = first.credit_score;
    let mut score_max = first.credit_score;
    let mut score_sum = 0.0;

    for s in &dataset.samples {
        score_min = score_min.min(s.credit_score);
        score_max = score_max.max(s.credit_score);
        score_sum += f64::from(s.credit_score);
    }

    let (n_not_worthy, n_worthy) = dataset.label_counts();
    Some(DatasetStats {
        n_samples: dataset.len(),
        n_worthy,
        n_not_worthy,
        score_min,
        score_max,
        score_mean: score_sum / dataset.len() as f64,
    })
}
