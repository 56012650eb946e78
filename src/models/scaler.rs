//! Feature standardization for scale-sensitive models.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::math::column_mean_std;

/// Per-feature `(x - mean) / scale` transform fitted on the training partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit on training rows. Constant columns get a unit scale so they map to 0.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, AppError> {
        let (mean, std) = column_mean_std(rows).ok_or_else(|| {
            AppError::Configuration("cannot fit scaler on an empty or ragged matrix".to_string())
        })?;
        let scale = std
            .into_iter()
            .map(|s| if s.is_finite() && s > 0.0 { s } else { 1.0 })
            .collect();
        Ok(Self { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Whether the stored parameters are usable (matching widths, finite, non-zero scale).
    pub fn is_well_formed(&self) -> bool {
        self.mean.len() == self.scale.len()
            && self.mean.iter().all(|m| m.is_finite())
            && self.scale.iter().all(|s| s.is_finite() && *s > 0.0)
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardizes_to_zero_mean_unit_variance() {
        let rows = vec![vec![1.0, 100.0], vec![2.0, 200.0], vec![3.0, 300.0], vec![4.0, 400.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        let z = scaler.transform(&rows);

        for j in 0..2 {
            let col: Vec<f64> = z.iter().map(|r| r[j]).collect();
            let mean = col.iter().sum::<f64>() / col.len() as f64;
            let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / col.len() as f64;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn constant_column_maps_to_zero() {
        let rows = vec![vec![5.0], vec![5.0], vec![5.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        assert!(scaler.is_well_formed());
        assert_eq!(scaler.transform_row(&[5.0]), vec![0.0]);
    }

    #[test]
    fn empty_matrix_is_rejected() {
        assert!(matches!(StandardScaler::fit(&[]), Err(AppError::Configuration(_))));
    }
}
