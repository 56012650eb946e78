//! L2-regularised logistic regression fitted by Newton / IRLS.
//!
//! Objective (intercept unpenalised, `λ = 1 / C`):
//!
//! ```text
//! minimize  Σ logloss(y_i, σ(b + wᵀx_i)) + (λ / 2) ‖w‖²
//! ```
//!
//! Each iteration solves `H δ = g` with
//! - `g = Xᵀ(p − y) + λ w′`
//! - `H = Xᵀ diag(p(1 − p)) X + λ I′`
//!
//! where `′` zeroes the intercept entry. Expects standardized inputs.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::math::{sigmoid, solve_least_squares};
use crate::models::tree::check_training_matrix;

/// Solver settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticParams {
    /// Inverse regularisation strength.
    pub c: f64,
    pub max_iter: usize,
    /// Stop once the largest Newton step component falls below this.
    pub tol: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LogisticRegression {
    pub fn fit(x: &[Vec<f64>], y: &[bool], params: &LogisticParams) -> Result<Self, AppError> {
        let d = check_training_matrix(x, y)?;
        if !(params.c.is_finite() && params.c > 0.0) {
            return Err(AppError::Configuration(format!(
                "logistic C must be finite and > 0, got {}",
                params.c
            )));
        }
        let lambda = 1.0 / params.c;
        let p = d + 1;

        // Column 0 is the intercept.
        let mut beta = DVector::<f64>::zeros(p);
        let mut row = vec![1.0; p];
        let mut converged = false;

        for iter in 0..params.max_iter {
            let mut grad = DVector::<f64>::zeros(p);
            let mut hess = DMatrix::<f64>::zeros(p, p);

            for (xi, &yi) in x.iter().zip(y) {
                row[1..].copy_from_slice(xi);
                let z: f64 = row.iter().zip(beta.iter()).map(|(a, b)| a * b).sum();
                let pi = sigmoid(z);
                let resid = pi - if yi { 1.0 } else { 0.0 };
                let w = pi * (1.0 - pi);

                for a in 0..p {
                    grad[a] += resid * row[a];
                    let wa = w * row[a];
                    for b in a..p {
                        hess[(a, b)] += wa * row[b];
                    }
                }
            }

            for a in 0..p {
                for b in 0..a {
                    hess[(a, b)] = hess[(b, a)];
                }
            }
            for j in 1..p {
                grad[j] += lambda * beta[j];
                hess[(j, j)] += lambda;
            }

            let step = solve_least_squares(&hess, &grad).ok_or_else(|| {
                AppError::Configuration(format!(
                    "logistic regression Newton system is singular at iteration {iter}"
                ))
            })?;
            beta -= &step;

            let max_step = step.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            if max_step < params.tol {
                debug!(iterations = iter + 1, "logistic regression converged");
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                max_iter = params.max_iter,
                "logistic regression did not converge; keeping last iterate"
            );
        }

        Ok(Self {
            intercept: beta[0],
            coefficients: beta.iter().skip(1).copied().collect(),
        })
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn decision_function(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }

    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        sigmoid(self.decision_function(row))
    }

    pub fn is_well_formed(&self) -> bool {
        !self.coefficients.is_empty()
            && self.intercept.is_finite()
            && self.coefficients.iter().all(|w| w.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> LogisticParams {
        LogisticParams {
            c: 1.0,
            max_iter: 100,
            tol: 1e-10,
        }
    }

    /// Overlapping classes along feature 0; feature 1 is pure noise.
    fn overlapping(n: usize) -> (Vec<Vec<f64>>, Vec<bool>) {
        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            let t = (i as f64 / n as f64) * 4.0 - 2.0;
            let noise = ((i * 37) % 17) as f64 / 17.0 - 0.5;
            x.push(vec![t, noise]);
            // Mostly positive for t > 0, with a few flipped labels near the boundary.
            y.push(if i % 9 == 0 { t < 0.0 } else { t > 0.0 });
        }
        (x, y)
    }

    #[test]
    fn learns_direction_of_signal() {
        let (x, y) = overlapping(400);
        let model = LogisticRegression::fit(&x, &y, &params()).unwrap();
        assert_eq!(model.n_features(), 2);
        assert!(model.coefficients()[0] > 1.0, "coef = {:?}", model.coefficients());
        assert!(model.coefficients()[0].abs() > 3.0 * model.coefficients()[1].abs());
        assert!(model.predict_proba(&[1.5, 0.0]) > 0.8);
        assert!(model.predict_proba(&[-1.5, 0.0]) < 0.2);
    }

    #[test]
    fn stronger_regularisation_shrinks_weights() {
        let (x, y) = overlapping(400);
        let loose = LogisticRegression::fit(&x, &y, &params()).unwrap();
        let tight = LogisticRegression::fit(
            &x,
            &y,
            &LogisticParams {
                c: 0.001,
                ..params()
            },
        )
        .unwrap();
        assert!(tight.coefficients()[0].abs() < loose.coefficients()[0].abs());
    }

    #[test]
    fn separable_data_stays_finite() {
        // Perfect separation would diverge without the L2 term.
        let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64 / 10.0 - 2.0]).collect();
        let y: Vec<bool> = x.iter().map(|r| r[0] > 0.0).collect();
        let model = LogisticRegression::fit(&x, &y, &params()).unwrap();
        assert!(model.is_well_formed());
    }

    #[test]
    fn rejects_non_positive_c() {
        let (x, y) = overlapping(20);
        let err = LogisticRegression::fit(&x, &y, &LogisticParams { c: 0.0, ..params() }).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
