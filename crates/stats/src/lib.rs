//! Statistical helper functions for the tempest ARIMA engine.

use ndarray::{Array1, Array2};
use statrs::distribution::{ContinuousCDF, Normal};
use tempest_optim::linalg;

/// Arithmetic mean of a slice. Returns 0.0 if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Two-sided standard normal critical value `z` with `P(|Z| > z) = alpha`.
///
/// Returns `None` unless `0 < alpha < 1`.
pub fn normal_critical_value(alpha: f64) -> Option<f64> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return None;
    }
    let standard = Normal::new(0.0, 1.0).ok()?;
    Some(standard.inverse_cdf(1.0 - alpha / 2.0))
}

/// Ordinary least-squares estimates with classical standard errors.
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquares {
    /// One coefficient per regressor column, in column order.
    pub coefficients: Vec<f64>,
    /// Classical standard errors `sqrt(s² · diag((XᵀX)⁻¹))`.
    pub std_errors: Vec<f64>,
}

/// Regresses `y` on the given regressor columns (no implicit intercept).
///
/// Intended for the handful of regressors in an ARIMA mean/drift model, so
/// the normal equations are inverted directly.
/// Returns `None` if a column length differs from `y`, if there are no
/// residual degrees of freedom, or if `XᵀX` is singular.
pub fn least_squares(columns: &[&[f64]], y: &[f64]) -> Option<LeastSquares> {
    let k = columns.len();
    let n = y.len();
    if k == 0 || n <= k || columns.iter().any(|c| c.len() != n) {
        return None;
    }

    let dot = |a: &[f64], b: &[f64]| -> f64 { a.iter().zip(b).map(|(x, z)| x * z).sum() };
    let xtx = Array2::from_shape_fn((k, k), |(i, j)| dot(columns[i], columns[j]));
    let xty: Array1<f64> = columns.iter().map(|&c| dot(c, y)).collect();

    let inverse = linalg::invert_spd(&xtx)?;
    let coefficients = inverse.dot(&xty).to_vec();

    let rss: f64 = (0..n)
        .map(|t| {
            let fit: f64 = (0..k).map(|i| columns[i][t] * coefficients[i]).sum();
            (y[t] - fit).powi(2)
        })
        .sum();
    let s2 = rss / (n - k) as f64;

    let std_errors = inverse
        .diag()
        .iter()
        .map(|v| (s2 * v).max(0.0).sqrt())
        .collect();

    Some(LeastSquares {
        coefficients,
        std_errors,
    })
}
