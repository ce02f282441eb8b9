//! JSON reports.

use serde::Serialize;
use tempest_arima::{ArimaModel, FitStatus, Forecast};

/// Serializable summary of a fitted model. Non-finite numbers become `null`.
#[derive(Debug, Serialize)]
pub struct FitReport {
    pub order: String,
    pub strategy: &'static str,
    pub seasonal_frequency: usize,
    pub coefficients: Vec<NamedValue>,
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub aicc: f64,
    pub bic: f64,
    pub n_used: usize,
    pub status: &'static str,
    pub iterations: Option<usize>,
}

/// One coefficient with its standard error.
#[derive(Debug, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
}

#[derive(Debug, Serialize)]
pub struct ForecastReport {
    pub model: FitReport,
    pub alpha: f64,
    pub point: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub std_errors: Vec<f64>,
}

/// Coefficient labels in the flat layout, e.g. `ar1`, `sma2`, `drift`, `mean`.
fn coefficient_names(model: &ArimaModel) -> Vec<String> {
    let order = model.order();
    let mut names = Vec::with_capacity(order.n_coefficients());
    for (prefix, count) in [
        ("ar", order.p()),
        ("ma", order.q()),
        ("sar", order.seasonal_p()),
        ("sma", order.seasonal_q()),
    ] {
        names.extend((1..=count).map(|i| format!("{prefix}{i}")));
    }
    if order.drift() {
        names.push("drift".to_string());
    }
    if order.constant() {
        names.push("mean".to_string());
    }
    names
}

impl FitReport {
    pub fn new(model: &ArimaModel) -> Self {
        let coefficients = coefficient_names(model)
            .into_iter()
            .zip(model.coefficients().to_vec())
            .zip(model.std_errors())
            .map(|((name, estimate), &std_error)| NamedValue {
                name,
                estimate,
                std_error,
            })
            .collect();
        let (status, iterations) = match model.status() {
            FitStatus::Converged { iterations } => ("converged", Some(iterations)),
            FitStatus::NotConverged { iterations } => ("not-converged", Some(iterations)),
            FitStatus::Evaluated => ("evaluated", None),
        };
        Self {
            order: model.order().to_string(),
            strategy: model.strategy().name(),
            seasonal_frequency: model.seasonal_frequency(),
            coefficients,
            sigma2: model.sigma2(),
            log_likelihood: model.log_likelihood(),
            aic: model.aic(),
            aicc: model.aicc(),
            bic: model.bic(),
            n_used: model.n_used(),
            status,
            iterations,
        }
    }
}

impl ForecastReport {
    pub fn new(model: &ArimaModel, forecast: &Forecast) -> Self {
        Self {
            model: FitReport::new(model),
            alpha: forecast.alpha(),
            point: forecast.point().to_vec(),
            lower: forecast.lower().to_vec(),
            upper: forecast.upper().to_vec(),
            std_errors: forecast.std_errors().to_vec(),
        }
    }
}
