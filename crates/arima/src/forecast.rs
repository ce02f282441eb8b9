//! Point forecasts and Gaussian prediction intervals.
//!
//! Forecasts run the expanded ARMA recursion forward on the demeaned
//! differenced series with future innovations at their mean of zero, add the
//! regression terms back and integrate onto the original scale. Forecast
//! error variances come from the ψ-weights of the integrated model
//! `φ(B)Φ(Bˢ)(1−B)ᵈ(1−Bˢ)ᴰ`, so they grow without bound when `d + D > 0`.

use crate::difference::Differencer;
use crate::error::ArimaError;
use crate::model::ArimaModel;
use crate::poly;

/// Point forecasts with symmetric prediction bounds.
///
/// Each step's interval is marginal; no joint coverage is implied.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    point: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    std_errors: Vec<f64>,
    alpha: f64,
}

impl Forecast {
    pub fn point(&self) -> &[f64] {
        &self.point
    }

    /// Lower bounds, `point − z·se`.
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Upper bounds, `point + z·se`.
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Forecast standard errors per step.
    pub fn std_errors(&self) -> &[f64] {
        &self.std_errors
    }

    /// Significance level; the intervals cover `1 − alpha`.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Forecast horizon.
    pub fn steps(&self) -> usize {
        self.point.len()
    }
}

/// Value of the differenced time index at original position `t` (1-based).
///
/// Drift is only allowed with at most one difference, so the index is `t`,
/// a constant `1` after one regular difference, or `s` after one seasonal
/// difference.
fn drift_regressor_at(model: &ArimaModel, t: usize) -> f64 {
    let order = model.order();
    match (order.d(), order.seasonal_d()) {
        (0, 0) => t as f64,
        (1, 0) => 1.0,
        (0, 1) => model.seasonal_frequency() as f64,
        _ => 0.0,
    }
}

/// Point forecasts for the next `steps` periods.
pub fn forecast(model: &ArimaModel, steps: usize) -> Result<Vec<f64>, ArimaError> {
    let coefficients = model.coefficients();
    let period = model.seasonal_frequency();
    let phi = poly::expand_ar(coefficients.ar(), coefficients.seasonal_ar(), period);
    let theta = poly::expand_ma(coefficients.ma(), coefficients.seasonal_ma(), period);
    let mean = coefficients.mean().unwrap_or(0.0);
    let drift = coefficients.drift().unwrap_or(0.0);

    let n = model.time_series().len();
    let differencer = Differencer::for_order(&model.order(), period);
    let loss = differencer.loss();

    let mut w: Vec<f64> = model
        .differenced()
        .iter()
        .enumerate()
        .map(|(i, x)| x - mean - drift * drift_regressor_at(model, loss + i + 1))
        .collect();
    let mut e = model.innovations().to_vec();
    let n_diff = w.len();

    for _ in 0..steps {
        let t = w.len();
        let ar: f64 = phi
            .iter()
            .take(t)
            .enumerate()
            .map(|(i, c)| c * w[t - 1 - i])
            .sum();
        let ma: f64 = theta
            .iter()
            .take(t)
            .enumerate()
            .map(|(j, c)| c * e[t - 1 - j])
            .sum();
        w.push(ar + ma);
        e.push(0.0);
    }

    let future: Vec<f64> = w[n_diff..]
        .iter()
        .enumerate()
        .map(|(h, x)| x + mean + drift * drift_regressor_at(model, n + h + 1))
        .collect();
    differencer.integrate(&future, model.time_series().as_slice())
}

/// Forecast error variances `σ² Σ_{j<h} ψⱼ²` for `h = 1..=steps`.
pub fn forecast_variances(model: &ArimaModel, steps: usize) -> Vec<f64> {
    let order = model.order();
    let coefficients = model.coefficients();
    let period = model.seasonal_frequency();
    let phi = poly::expand_ar(coefficients.ar(), coefficients.seasonal_ar(), period);
    let theta = poly::expand_ma(coefficients.ma(), coefficients.seasonal_ma(), period);
    let integrated = poly::integrate_ar(&phi, order.d(), order.seasonal_d(), period);
    let psi = poly::psi_weights(&integrated, &theta, steps);

    let mut cumulative = 0.0;
    psi.iter()
        .map(|p| {
            cumulative += p * p;
            model.sigma2() * cumulative
        })
        .collect()
}

/// Point forecasts with `1 − alpha` Gaussian prediction intervals.
///
/// # Errors
///
/// [`ArimaError::InvalidAlpha`] unless `0 < alpha < 1`.
pub fn forecast_with_intervals(
    model: &ArimaModel,
    steps: usize,
    alpha: f64,
) -> Result<Forecast, ArimaError> {
    let z =
        tempest_stats::normal_critical_value(alpha).ok_or(ArimaError::InvalidAlpha { alpha })?;
    let point = forecast(model, steps)?;
    let std_errors: Vec<f64> = forecast_variances(model, steps)
        .into_iter()
        .map(f64::sqrt)
        .collect();
    let lower = point
        .iter()
        .zip(&std_errors)
        .map(|(p, se)| p - z * se)
        .collect();
    let upper = point
        .iter()
        .zip(&std_errors)
        .map(|(p, se)| p + z * se)
        .collect();
    Ok(Forecast {
        point,
        lower,
        upper,
        std_errors,
        alpha,
    })
}
