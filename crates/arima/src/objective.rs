//! Objective evaluation: conditional sum of squares and exact likelihood.
//!
//! The [`Evaluator`] owns the differenced series and the regressors and maps
//! a flat coefficient vector to an [`Evaluation`]. It is a pure function of
//! its inputs, so one evaluator can serve any number of optimiser probes.

use std::f64::consts::PI;

use crate::error::ArimaError;
use crate::kalman;
use crate::order::ArimaOrder;
use crate::poly;
use crate::state_space::StateSpace;

/// Which objective to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Objective {
    /// Conditional sum of squares.
    Css,
    /// Exact Gaussian likelihood via the Kalman filter.
    Ml,
}

/// Result of evaluating one coefficient vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Quantity minimised: the sum of squares (CSS) or the negative
    /// log-likelihood (ML). `+∞` for inadmissible coefficients and for an
    /// exact ML fit.
    pub value: f64,
    /// Residuals on the differenced scale, one per differenced observation.
    /// CSS residuals are zero over the conditioning window; ML residuals are
    /// standardised innovations `vₜ / √Fₜ`.
    pub residuals: Vec<f64>,
    /// Innovation variance estimate.
    pub sigma2: f64,
    /// Gaussian log-likelihood. NaN for an exact fit (`sigma2 == 0`), where
    /// the likelihood is unbounded.
    pub log_likelihood: f64,
    /// Number of observations the objective is based on.
    pub n_used: usize,
}

impl Evaluation {
    fn inadmissible(n: usize, n_used: usize) -> Self {
        Self {
            value: f64::INFINITY,
            residuals: vec![f64::NAN; n],
            sigma2: f64::NAN,
            log_likelihood: f64::NEG_INFINITY,
            n_used,
        }
    }

    /// `false` when the coefficients were rejected.
    pub fn is_admissible(&self) -> bool {
        self.value.is_finite()
    }
}

/// Coefficient vector split into its groups.
#[derive(Debug, Clone)]
pub(crate) struct Split<'a> {
    pub(crate) ar: &'a [f64],
    pub(crate) ma: &'a [f64],
    pub(crate) seasonal_ar: &'a [f64],
    pub(crate) seasonal_ma: &'a [f64],
    pub(crate) drift: f64,
    pub(crate) mean: f64,
}

impl<'a> Split<'a> {
    /// Splits `values` by `order`. The caller guarantees the length.
    pub(crate) fn new(order: &ArimaOrder, values: &'a [f64]) -> Self {
        let (ar, rest) = values.split_at(order.p());
        let (ma, rest) = rest.split_at(order.q());
        let (seasonal_ar, rest) = rest.split_at(order.seasonal_p());
        let (seasonal_ma, rest) = rest.split_at(order.seasonal_q());
        let (drift, rest) = rest.split_at(usize::from(order.drift()));
        Self {
            ar,
            ma,
            seasonal_ar,
            seasonal_ma,
            drift: drift.first().copied().unwrap_or(0.0),
            mean: rest.first().copied().unwrap_or(0.0),
        }
    }

    /// Stationary and invertible with finite regression terms.
    pub(crate) fn is_admissible(&self) -> bool {
        self.mean.is_finite()
            && self.drift.is_finite()
            && poly::is_stationary(self.ar)
            && poly::is_stationary(self.seasonal_ar)
            && poly::is_invertible(self.ma)
            && poly::is_invertible(self.seasonal_ma)
    }
}

/// Evaluates CSS and ML objectives for one differenced series.
#[derive(Debug, Clone)]
pub struct Evaluator {
    differenced: Vec<f64>,
    drift_regressor: Vec<f64>,
    order: ArimaOrder,
    period: usize,
}

impl Evaluator {
    /// `drift_regressor` is the time index `1..=n` differenced like the
    /// series; it must have the same length as `differenced`.
    pub fn new(
        differenced: Vec<f64>,
        drift_regressor: Vec<f64>,
        order: ArimaOrder,
        period: usize,
    ) -> Self {
        debug_assert_eq!(differenced.len(), drift_regressor.len());
        Self {
            differenced,
            drift_regressor,
            order,
            period,
        }
    }

    pub fn differenced(&self) -> &[f64] {
        &self.differenced
    }

    pub fn drift_regressor(&self) -> &[f64] {
        &self.drift_regressor
    }

    pub fn order(&self) -> &ArimaOrder {
        &self.order
    }

    /// Number of leading values CSS conditions on, `p + s·P`.
    pub fn conditioning(&self) -> usize {
        self.order.p() + self.period * self.order.seasonal_p()
    }

    /// Observations each objective is based on.
    pub fn n_used(&self, objective: Objective) -> usize {
        match objective {
            Objective::Css => self.differenced.len().saturating_sub(self.conditioning()),
            Objective::Ml => self.differenced.len(),
        }
    }

    /// Differenced series with the mean and drift removed.
    pub(crate) fn demeaned(&self, split: &Split<'_>) -> Vec<f64> {
        self.differenced
            .iter()
            .zip(&self.drift_regressor)
            .map(|(x, g)| x - split.mean - split.drift * g)
            .collect()
    }

    fn check_len(&self, coefficients: &[f64]) -> Result<(), ArimaError> {
        let expected = self.order.n_coefficients();
        if coefficients.len() != expected {
            return Err(ArimaError::invalid_order(format!(
                "{} has {expected} coefficients, got {}",
                self.order,
                coefficients.len()
            )));
        }
        Ok(())
    }

    /// Whether `coefficients` are stationary and invertible, independent of
    /// the data.
    ///
    /// # Errors
    ///
    /// [`ArimaError::InvalidOrder`] on a length mismatch.
    pub fn is_admissible(&self, coefficients: &[f64]) -> Result<bool, ArimaError> {
        self.check_len(coefficients)?;
        Ok(Split::new(&self.order, coefficients).is_admissible())
    }

    /// Evaluates `coefficients` (standard layout) under `objective`.
    ///
    /// Inadmissible coefficients are not an error: they evaluate to
    /// `value = +∞`.
    ///
    /// # Errors
    ///
    /// [`ArimaError::InvalidOrder`] if `coefficients` does not have the
    /// length the order requires, and [`ArimaError::InsufficientData`] if
    /// the CSS conditioning window covers the whole series.
    pub fn evaluate(
        &self,
        coefficients: &[f64],
        objective: Objective,
    ) -> Result<Evaluation, ArimaError> {
        self.check_len(coefficients)?;
        let n = self.differenced.len();
        if objective == Objective::Css && n <= self.conditioning() {
            return Err(ArimaError::InsufficientData {
                n,
                min: self.conditioning() + 1,
            });
        }
        let split = Split::new(&self.order, coefficients);
        if !split.is_admissible() {
            return Ok(Evaluation::inadmissible(n, self.n_used(objective)));
        }
        let w = self.demeaned(&split);
        let phi = poly::expand_ar(split.ar, split.seasonal_ar, self.period);
        let theta = poly::expand_ma(split.ma, split.seasonal_ma, self.period);

        Ok(match objective {
            Objective::Css => self.css(&w, &phi, &theta),
            Objective::Ml => self.exact(&w, &phi, &theta),
        })
    }

    fn css(&self, w: &[f64], phi: &[f64], theta: &[f64]) -> Evaluation {
        let ncond = self.conditioning();
        let residuals = conditional_residuals(w, phi, theta, ncond);
        let n_used = w.len() - ncond;
        let value: f64 = residuals.iter().map(|e| e * e).sum();
        let nf = n_used as f64;
        let sigma2 = value / nf;
        let log_likelihood = gaussian_log_likelihood(sigma2, nf, 0.0);
        Evaluation {
            value: if value.is_finite() { value } else { f64::INFINITY },
            residuals,
            sigma2,
            log_likelihood,
            n_used,
        }
    }

    fn exact(&self, w: &[f64], phi: &[f64], theta: &[f64]) -> Evaluation {
        let n = w.len();
        let ss = StateSpace::new(phi, theta);
        let Some(innovations) = ss
            .stationary_covariance()
            .and_then(|p0| kalman::filter(&ss, p0, w))
        else {
            return Evaluation::inadmissible(n, n);
        };

        let nf = n as f64;
        let sigma2 = innovations.weighted_sum_of_squares() / nf;
        let log_likelihood = gaussian_log_likelihood(sigma2, nf, innovations.log_det());
        let residuals = innovations
            .errors
            .iter()
            .zip(&innovations.variances)
            .map(|(v, f)| v / f.sqrt())
            .collect();
        let value = -log_likelihood;
        Evaluation {
            value: if value.is_finite() { value } else { f64::INFINITY },
            residuals,
            sigma2,
            log_likelihood,
            n_used: n,
        }
    }
}

/// Concentrated Gaussian log-likelihood `−½(n ln 2πσ² + log_det + n)`.
///
/// An exact fit has `σ² = 0` and an unbounded likelihood; it is reported as
/// NaN rather than `+∞`.
fn gaussian_log_likelihood(sigma2: f64, n: f64, log_det: f64) -> f64 {
    if sigma2 > 0.0 {
        -0.5 * (n * (2.0 * PI * sigma2).ln() + log_det + n)
    } else {
        f64::NAN
    }
}

/// Residuals of the expanded ARMA recursion with pre-sample values set to
/// zero; the first `ncond` residuals are zero.
pub(crate) fn conditional_residuals(
    w: &[f64],
    phi: &[f64],
    theta: &[f64],
    ncond: usize,
) -> Vec<f64> {
    let mut e = vec![0.0; w.len()];
    for t in ncond..w.len() {
        let ar: f64 = phi
            .iter()
            .enumerate()
            .filter(|&(i, _)| i < t)
            .map(|(i, c)| c * w[t - 1 - i])
            .sum();
        let ma: f64 = theta
            .iter()
            .enumerate()
            .filter(|&(j, _)| j < t)
            .map(|(j, c)| c * e[t - 1 - j])
            .sum();
        e[t] = w[t] - ar - ma;
    }
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn evaluator(values: &[f64], order: ArimaOrder) -> Evaluator {
        let regressor = (1..=values.len()).map(|t| t as f64).collect();
        Evaluator::new(values.to_vec(), regressor, order, 1)
    }

    const W: [f64; 6] = [1.0, -0.5, 0.8, 0.3, -1.2, 0.4];

    #[test]
    fn css_arma11_by_hand() {
        let ev = evaluator(&W, ArimaOrder::new(1, 0, 1).with_constant(false));
        let out = ev.evaluate(&[0.5, 0.2], Objective::Css).unwrap();
        // e₀ = 0, eₜ = wₜ − 0.5 wₜ₋₁ − 0.2 eₜ₋₁
        let mut e = [0.0; 6];
        for t in 1..6 {
            e[t] = W[t] - 0.5 * W[t - 1] - 0.2 * e[t - 1];
        }
        for (a, b) in out.residuals.iter().zip(e.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
        let ss: f64 = e.iter().map(|x| x * x).sum();
        assert_eq!(out.n_used, 5);
        assert_abs_diff_eq!(out.value, ss, epsilon = 1e-12);
        assert_abs_diff_eq!(out.sigma2, ss / 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            out.log_likelihood,
            -2.5 * ((2.0 * PI * ss / 5.0).ln() + 1.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn css_mean_is_removed() {
        let shifted: Vec<f64> = W.iter().map(|x| x + 10.0).collect();
        let plain = evaluator(&W, ArimaOrder::new(0, 0, 1).with_constant(false))
            .evaluate(&[0.3], Objective::Css)
            .unwrap();
        let with_mean = evaluator(&shifted, ArimaOrder::new(0, 0, 1))
            .evaluate(&[0.3, 10.0], Objective::Css)
            .unwrap();
        assert_abs_diff_eq!(plain.value, with_mean.value, epsilon = 1e-10);
    }

    #[test]
    fn ml_white_noise_closed_form() {
        let ev = evaluator(&W, ArimaOrder::new(0, 0, 0).with_constant(false));
        let out = ev.evaluate(&[], Objective::Ml).unwrap();
        let ss: f64 = W.iter().map(|x| x * x).sum();
        let sigma2 = ss / 6.0;
        assert_abs_diff_eq!(out.sigma2, sigma2, epsilon = 1e-12);
        assert_abs_diff_eq!(
            out.log_likelihood,
            -3.0 * ((2.0 * PI * sigma2).ln() + 1.0),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(out.value, -out.log_likelihood);
    }

    #[test]
    fn inadmissible_candidates_are_penalised() {
        let ev = evaluator(&W, ArimaOrder::new(1, 0, 1).with_constant(false));
        for objective in [Objective::Css, Objective::Ml] {
            assert_eq!(ev.evaluate(&[1.2, 0.0], objective).unwrap().value, f64::INFINITY);
            assert_eq!(ev.evaluate(&[0.0, -1.0], objective).unwrap().value, f64::INFINITY);
            assert!(!ev.evaluate(&[0.0, -1.0], objective).unwrap().is_admissible());
        }
    }

    #[test]
    fn wrong_length_is_an_error() {
        let ev = evaluator(&W, ArimaOrder::new(1, 0, 1));
        let err = ev.evaluate(&[0.1], Objective::Css).unwrap_err();
        assert!(matches!(err, ArimaError::InvalidOrder { .. }));
    }

    #[test]
    fn drift_regressor_is_removed() {
        let trend: Vec<f64> = (1..=8).map(|t| 2.0 + 0.5 * t as f64).collect();
        let ev = evaluator(&trend, ArimaOrder::new(0, 0, 0).with_drift(true));
        let out = ev.evaluate(&[0.5, 2.0], Objective::Css).unwrap();
        assert_abs_diff_eq!(out.value, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn admissibility_ignores_the_data() {
        let ev = evaluator(&[0.0; 10], ArimaOrder::new(1, 0, 1));
        assert!(ev.is_admissible(&[0.3, 0.2, 0.0]).unwrap());
        assert!(!ev.is_admissible(&[1.2, 0.2, 0.0]).unwrap());
        assert!(!ev.is_admissible(&[0.3, 0.2, f64::NAN]).unwrap());
        assert!(ev.is_admissible(&[0.3]).is_err());
    }

    #[test]
    fn exact_fit_has_undefined_likelihood() {
        let ev = evaluator(&[0.0; 10], ArimaOrder::new(1, 0, 1));
        for objective in [Objective::Css, Objective::Ml] {
            let out = ev.evaluate(&[0.3, 0.2, 0.0], objective).unwrap();
            assert_eq!(out.sigma2, 0.0);
            assert!(out.log_likelihood.is_nan());
            assert_ne!(out.value, f64::NEG_INFINITY);
            assert!(out.residuals.iter().all(|&e| e == 0.0));
        }
    }

    #[test]
    fn css_needs_observations_past_conditioning() {
        let ev = evaluator(&[1.0, 2.0], ArimaOrder::new(3, 0, 0).with_constant(false));
        let err = ev.evaluate(&[0.1; 3], Objective::Css).unwrap_err();
        assert!(matches!(err, ArimaError::InsufficientData { n: 2, min: 4 }));
        assert!(ev.evaluate(&[0.1; 3], Objective::Ml).is_ok());
    }

    #[test]
    fn css_conditions_on_seasonal_lags() {
        let values: Vec<f64> = (0..12).map(|t| (t as f64 * 0.7).cos()).collect();
        let regressor = vec![0.0; 12];
        let ev = Evaluator::new(
            values,
            regressor,
            ArimaOrder::seasonal(1, 0, 0, 1, 0, 0).with_constant(false),
            4,
        );
        assert_eq!(ev.conditioning(), 5);
        let out = ev.evaluate(&[0.3, 0.2], Objective::Css).unwrap();
        assert_eq!(out.n_used, 7);
        assert!(out.residuals[..5].iter().all(|&e| e == 0.0));
    }
}
