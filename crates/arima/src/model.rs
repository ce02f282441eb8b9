//! Fitted ARIMA model and the model-family trait.

use std::hash::{Hash, Hasher};

use ndarray::Array2;
use tempest_series::TimeSeries;

use crate::coefficients::ArimaCoefficients;
use crate::config::{ArimaConfig, FittingStrategy};
use crate::error::ArimaError;
use crate::forecast::{self, Forecast};
use crate::order::ArimaOrder;

/// Capabilities shared by fitted time-series models.
pub trait Model: Sized {
    /// What [`fit`](Model::fit) needs besides the series.
    type Config;
    /// Error type for fitting and forecasting.
    type Error;

    /// Fits the model to `series`.
    fn fit(series: &TimeSeries, config: &Self::Config) -> Result<Self, Self::Error>;

    /// Point forecasts for the next `steps` periods.
    fn point_forecast(&self, steps: usize) -> Result<Vec<f64>, Self::Error>;

    /// Point forecasts with `1 − alpha` prediction intervals.
    fn forecast(&self, steps: usize, alpha: f64) -> Result<Forecast, Self::Error>;

    /// The series the model was fitted to.
    fn time_series(&self) -> &TimeSeries;

    /// In-sample fitted values, aligned with [`time_series`](Model::time_series).
    fn fitted(&self) -> &[f64];

    /// In-sample residuals, aligned with [`time_series`](Model::time_series).
    fn residuals(&self) -> &[f64];
}

/// How the coefficients of an [`ArimaModel`] were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FitStatus {
    /// The optimiser met a convergence criterion.
    Converged {
        /// Iterations across all phases.
        iterations: usize,
    },
    /// The optimiser ran out of iterations; the best point is kept.
    NotConverged {
        /// Iterations across all phases.
        iterations: usize,
    },
    /// Coefficients were supplied and only evaluated.
    Evaluated,
}

/// A fitted seasonal ARIMA model. Immutable once built.
///
/// ```mermaid
/// graph LR
///     A["ArimaModel::fit(&series, &config)?"] --> B["ArimaModel"]
///     B --> C[".coefficients() / .std_errors()"]
///     B --> D[".sigma2() / .log_likelihood() / .aic()"]
///     B --> E[".fitted() / .residuals()"]
///     B --> F[".forecast(h, alpha)?"]
/// ```
///
/// Equality and hashing cover the series, order, coefficients and
/// strategy, comparing floating-point values bit for bit.
#[derive(Debug, Clone)]
pub struct ArimaModel {
    pub(crate) series: TimeSeries,
    pub(crate) order: ArimaOrder,
    pub(crate) strategy: FittingStrategy,
    pub(crate) seasonal_frequency: usize,
    pub(crate) coefficients: ArimaCoefficients,
    pub(crate) std_errors: Vec<f64>,
    pub(crate) covariance: Array2<f64>,
    pub(crate) sigma2: f64,
    pub(crate) log_likelihood: f64,
    pub(crate) n_used: usize,
    pub(crate) residuals: Vec<f64>,
    pub(crate) fitted: Vec<f64>,
    pub(crate) differenced: Vec<f64>,
    pub(crate) innovations: Vec<f64>,
    pub(crate) status: FitStatus,
}

impl ArimaModel {
    /// Fits (or, for fixed coefficients, evaluates) a model.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`ArimaError::InvalidOrder`] | seasonal order without a seasonal frequency, unidentifiable drift, bad starting point, inadmissible fixed coefficients |
    /// | [`ArimaError::InsufficientData`] | series too short for the differencing and coefficient count |
    /// | [`ArimaError::Interrupted`] | the config's cancel token was tripped |
    /// | [`ArimaError::Optim`] | invalid optimiser options |
    pub fn fit(series: &TimeSeries, config: &ArimaConfig) -> Result<Self, ArimaError> {
        crate::estimate::fit(series, config)
    }

    pub fn time_series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn strategy(&self) -> FittingStrategy {
        self.strategy
    }

    /// Observations per seasonal cycle.
    pub fn seasonal_frequency(&self) -> usize {
        self.seasonal_frequency
    }

    pub fn coefficients(&self) -> &ArimaCoefficients {
        &self.coefficients
    }

    /// Standard errors in the coefficient layout. NaN where unavailable.
    pub fn std_errors(&self) -> &[f64] {
        &self.std_errors
    }

    /// Approximate covariance matrix of the coefficients.
    pub fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }

    /// Innovation variance.
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Gaussian log-likelihood; NaN for an exact fit with `sigma2 == 0`.
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Observations the likelihood is based on.
    pub fn n_used(&self) -> usize {
        self.n_used
    }

    /// Number of estimated parameters, σ² included.
    pub fn n_parameters(&self) -> usize {
        self.order.n_coefficients() + 1
    }

    /// `AIC = 2k − 2ℓ`.
    pub fn aic(&self) -> f64 {
        2.0 * self.n_parameters() as f64 - 2.0 * self.log_likelihood
    }

    /// Small-sample corrected AIC. Infinite when `n_used ≤ k + 1`.
    pub fn aicc(&self) -> f64 {
        let k = self.n_parameters() as f64;
        let denom = self.n_used as f64 - k - 1.0;
        if denom <= 0.0 {
            return f64::INFINITY;
        }
        self.aic() + 2.0 * k * (k + 1.0) / denom
    }

    /// `BIC = k ln(n) − 2ℓ`.
    pub fn bic(&self) -> f64 {
        let k = self.n_parameters() as f64;
        self.aic() - 2.0 * k + k * (self.n_used as f64).ln()
    }

    pub fn fitted(&self) -> &[f64] {
        &self.fitted
    }

    /// Residuals aligned with the series. The first `d + D·s` entries,
    /// which have no differenced counterpart, are zero.
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    pub fn differenced(&self) -> &[f64] {
        &self.differenced
    }

    pub(crate) fn innovations(&self) -> &[f64] {
        &self.innovations
    }

    pub fn status(&self) -> FitStatus {
        self.status
    }

    /// Escalates a soft non-convergence into an error.
    pub fn ensure_converged(&self) -> Result<&Self, ArimaError> {
        match self.status {
            FitStatus::NotConverged { iterations } => {
                Err(ArimaError::NonConvergence { iterations })
            }
            FitStatus::Converged { .. } | FitStatus::Evaluated => Ok(self),
        }
    }

    /// Point forecasts for the next `steps` periods.
    pub fn point_forecast(&self, steps: usize) -> Result<Vec<f64>, ArimaError> {
        forecast::forecast(self, steps)
    }

    /// Point forecasts with `1 − alpha` prediction intervals.
    pub fn forecast(&self, steps: usize, alpha: f64) -> Result<Forecast, ArimaError> {
        forecast::forecast_with_intervals(self, steps, alpha)
    }

    /// Forecast error variances for horizons `1..=steps`.
    pub fn forecast_variances(&self, steps: usize) -> Vec<f64> {
        forecast::forecast_variances(self, steps)
    }

    fn identity_bits(&self) -> (Vec<u64>, Vec<u64>) {
        let series = self.series.as_slice().iter().map(|v| v.to_bits()).collect();
        let coefficients = self
            .coefficients
            .to_vec()
            .iter()
            .map(|v| v.to_bits())
            .collect();
        (series, coefficients)
    }
}

impl PartialEq for ArimaModel {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
            && self.strategy == other.strategy
            && self.series.period() == other.series.period()
            && self.identity_bits() == other.identity_bits()
    }
}

impl Eq for ArimaModel {}

impl Hash for ArimaModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.order.hash(state);
        self.strategy.hash(state);
        self.series.period().hash(state);
        self.identity_bits().hash(state);
    }
}

impl Model for ArimaModel {
    type Config = ArimaConfig;
    type Error = ArimaError;

    fn fit(series: &TimeSeries, config: &ArimaConfig) -> Result<Self, ArimaError> {
        ArimaModel::fit(series, config)
    }

    fn point_forecast(&self, steps: usize) -> Result<Vec<f64>, ArimaError> {
        ArimaModel::point_forecast(self, steps)
    }

    fn forecast(&self, steps: usize, alpha: f64) -> Result<Forecast, ArimaError> {
        ArimaModel::forecast(self, steps, alpha)
    }

    fn time_series(&self) -> &TimeSeries {
        ArimaModel::time_series(self)
    }

    fn fitted(&self) -> &[f64] {
        ArimaModel::fitted(self)
    }

    fn residuals(&self) -> &[f64] {
        ArimaModel::residuals(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::collections::HashSet;

    const Y: [f64; 10] = [3.0, 5.0, 4.0, 6.0, 5.5, 4.5, 5.0, 7.0, 6.0, 5.0];

    fn evaluated(phi: f64, strategy: FittingStrategy) -> ArimaModel {
        let series = TimeSeries::from_values(Y.to_vec()).unwrap();
        let coefs = ArimaCoefficients::new(vec![phi], vec![]).with_mean(5.0);
        let config = ArimaConfig::from_coefficients(coefs).with_strategy(strategy);
        ArimaModel::fit(&series, &config).unwrap()
    }

    #[test]
    fn information_criteria() {
        let model = evaluated(0.4, FittingStrategy::Css);
        let ll = model.log_likelihood();
        let k = 3.0;
        let n = 9.0;
        assert_eq!(model.n_parameters(), 3);
        assert_eq!(model.n_used(), 9);
        assert_abs_diff_eq!(model.aic(), 2.0 * k - 2.0 * ll, epsilon = 1e-12);
        assert_abs_diff_eq!(
            model.aicc(),
            model.aic() + 2.0 * k * (k + 1.0) / (n - k - 1.0),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(model.bic(), k * n.ln() - 2.0 * ll, epsilon = 1e-12);
    }

    #[test]
    fn fitted_plus_residuals_reproduce_series() {
        let model = evaluated(0.4, FittingStrategy::Css);
        assert_eq!(model.residuals()[0], 0.0);
        for ((y, f), e) in Y.iter().zip(model.fitted()).zip(model.residuals()) {
            assert_abs_diff_eq!(*y, f + e, epsilon = 1e-12);
        }
    }

    #[test]
    fn evaluated_models_pass_convergence_check() {
        let model = evaluated(0.4, FittingStrategy::Ml);
        assert_eq!(model.status(), FitStatus::Evaluated);
        assert!(model.ensure_converged().is_ok());
        assert_eq!(model.n_used(), 10);
    }

    #[test]
    fn non_convergence_escalates() {
        let mut model = evaluated(0.4, FittingStrategy::Css);
        model.status = FitStatus::NotConverged { iterations: 7 };
        let err = model.ensure_converged().unwrap_err();
        assert!(matches!(err, ArimaError::NonConvergence { iterations: 7 }));
    }

    #[test]
    fn equality_and_hash_follow_coefficients() {
        let a = evaluated(0.4, FittingStrategy::Css);
        let b = evaluated(0.4, FittingStrategy::Css);
        let c = evaluated(0.41, FittingStrategy::Css);
        let d = evaluated(0.4, FittingStrategy::Ml);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);

        let set: HashSet<ArimaModel> = [a, b, c, d].into_iter().collect();
        assert_eq!(set.len(), 3);
    }

    fn horizon_of<M: Model>(model: &M, steps: usize) -> usize
    where
        M::Error: std::fmt::Debug,
    {
        model.point_forecast(steps).unwrap().len()
    }

    #[test]
    fn usable_through_model_trait() {
        let model = evaluated(0.4, FittingStrategy::Css);
        assert_eq!(horizon_of(&model, 4), 4);
        assert_eq!(Model::time_series(&model).len(), 10);
        assert_eq!(Model::fitted(&model).len(), 10);
    }
}
