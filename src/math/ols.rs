//! Least-squares linear solver.
//!
//! Logistic regression is fitted by Newton / IRLS iterations. Each iteration
//! solves a small linear system of the form:
//!
//! ```text
//! (Xᵀ S X + λ I′) δ = g
//! ```
//!
//! with one column per feature plus the intercept.
//!
//! Implementation choices:
//! - We use SVD so the solve stays well defined even when the system is
//!   near-singular (e.g. a constant column after scaling).
//! - The dimension is tiny (10 columns), so SVD performance is irrelevant.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}
