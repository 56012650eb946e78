//! Small numeric helpers shared by the model families.

/// Logistic function, evaluated without overflow for large `|z|`.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Gini impurity of a two-class node.
pub fn gini(counts: [usize; 2]) -> f64 {
    let n = counts[0] + counts[1];
    if n == 0 {
        return 0.0;
    }
    let p0 = counts[0] as f64 / n as f64;
    let p1 = counts[1] as f64 / n as f64;
    1.0 - p0 * p0 - p1 * p1
}

/// Per-column mean and population standard deviation.
///
/// Returns `None` for an empty matrix or ragged rows.
pub fn column_mean_std(rows: &[Vec<f64>]) -> Option<(Vec<f64>, Vec<f64>)> {
    let width = rows.first()?.len();
    if rows.iter().any(|r| r.len() != width) {
        return None;
    }
    let n = rows.len() as f64;

    let mut mean = vec![0.0; width];
    for r in rows {
        for (m, v) in mean.iter_mut().zip(r) {
            *m += v;
        }
    }
    for m in &mut mean {
        *m /= n;
    }

    let mut var = vec![0.0; width];
    for r in rows {
        for j in 0..width {
            let d = r[j] - mean[j];
            var[j] += d * d;
        }
    }
    let std = var.into_iter().map(|v| (v / n).sqrt()).collect();

    Some((mean, std))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_is_symmetric_and_finite() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-15);
        for z in [0.3, 2.0, 40.0, 800.0] {
            assert!((sigmoid(z) + sigmoid(-z) - 1.0).abs() < 1e-12);
            assert!(sigmoid(z).is_finite() && sigmoid(-z).is_finite());
        }
    }

    #[test]
    fn gini_extremes() {
        assert_eq!(gini([10, 0]), 0.0);
        assert!((gini([5, 5]) - 0.5).abs() < 1e-12);
        assert_eq!(gini([0, 0]), 0.0);
    }

    #[test]
    fn mean_std_population() {
        let rows = vec![vec![1.0, 10.0], vec![3.0, 10.0]];
        let (mean, std) = column_mean_std(&rows).unwrap();
        assert_eq!(mean, vec![2.0, 10.0]);
        assert_eq!(std, vec![1.0, 0.0]);

        assert!(column_mean_std(&[]).is_none());
        assert!(column_mean_std(&[vec![1.0], vec![1.0, 2.0]]).is_none());
    }
}
