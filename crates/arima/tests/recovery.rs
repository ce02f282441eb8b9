//! Parameter recovery on simulated series for tempest-arima.

use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tempest_arima::{ArimaConfig, ArimaModel, ArimaOrder, FitStatus, FittingStrategy};
use tempest_series::{TimePeriod, TimeSeries};

const BURN_IN: usize = 200;

fn noise(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    (0..n).map(|_| normal.sample(&mut rng)).collect()
}

fn generate_arma11(phi: f64, theta: f64, mean: f64, n: usize, seed: u64) -> Vec<f64> {
    let eps = noise(n + BURN_IN, seed);
    let mut x = vec![0.0; n + BURN_IN];
    for t in 1..x.len() {
        x[t] = phi * x[t - 1] + eps[t] + theta * eps[t - 1];
    }
    x[BURN_IN..].iter().map(|v| v + mean).collect()
}

/// `(1 − B)(1 − B¹²) yₜ = (1 + θB)(1 + ΘB¹²) eₜ`, started from zeros.
fn generate_airline(theta: f64, seasonal_theta: f64, n: usize, seed: u64) -> Vec<f64> {
    let eps = noise(n, seed);
    let at = |t: usize, lag: usize| if t >= lag { eps[t - lag] } else { 0.0 };
    let w: Vec<f64> = (0..n)
        .map(|t| {
            eps[t] + theta * at(t, 1) + seasonal_theta * at(t, 12)
                + theta * seasonal_theta * at(t, 13)
        })
        .collect();
    let mut z = vec![0.0; n];
    for t in 0..n {
        z[t] = w[t] + if t >= 12 { z[t - 12] } else { 0.0 };
    }
    let mut y = vec![0.0; n];
    for t in 0..n {
        y[t] = z[t] + if t >= 1 { y[t - 1] } else { 0.0 };
    }
    y.iter().map(|v| v + 100.0).collect()
}

fn fit_arma11(strategy: FittingStrategy) -> ArimaModel {
    let data = generate_arma11(0.6, 0.3, 10.0, 2000, 42);
    let series = TimeSeries::from_values(data).unwrap();
    let config = ArimaConfig::from_order(ArimaOrder::new(1, 0, 1)).with_strategy(strategy);
    ArimaModel::fit(&series, &config).unwrap()
}

fn assert_arma11_recovered(model: &ArimaModel) {
    let c = model.coefficients();
    assert!((c.ar()[0] - 0.6).abs() < 0.1, "phi = {}", c.ar()[0]);
    assert!((c.ma()[0] - 0.3).abs() < 0.1, "theta = {}", c.ma()[0]);
    let mean = c.mean().unwrap();
    assert!((mean - 10.0).abs() < 0.3, "mean = {mean}");
    assert!(
        model.sigma2() > 0.85 && model.sigma2() < 1.15,
        "sigma2 = {}",
        model.sigma2()
    );
    assert!(matches!(model.status(), FitStatus::Converged { .. }));
    assert!(model.std_errors().iter().all(|se| se.is_finite() && *se > 0.0));
}

#[test]
fn arma11_css_recovery() {
    let model = fit_arma11(FittingStrategy::Css);
    assert_arma11_recovered(&model);
    assert_eq!(model.n_used(), 1999);
}

#[test]
fn arma11_ml_recovery() {
    let model = fit_arma11(FittingStrategy::Ml);
    assert_arma11_recovered(&model);
    assert_eq!(model.n_used(), 2000);
}

#[test]
fn arma11_css_ml_recovery() {
    let model = fit_arma11(FittingStrategy::CssMl);
    assert_arma11_recovered(&model);
}

#[test]
fn css_ml_and_ml_reach_the_same_likelihood() {
    let ml = fit_arma11(FittingStrategy::Ml);
    let css_ml = fit_arma11(FittingStrategy::CssMl);
    // Both maximise the same exact likelihood.
    assert!((ml.log_likelihood() - css_ml.log_likelihood()).abs() < 1e-2);
}

#[test]
fn standard_errors_are_plausible() {
    let model = fit_arma11(FittingStrategy::Ml);
    // Asymptotic standard error of φ is about 0.03 at this sample size.
    let se_phi = model.std_errors()[0];
    assert!(se_phi > 0.01 && se_phi < 0.08, "se(phi) = {se_phi}");
}

#[test]
fn airline_model_recovery() {
    let data = generate_airline(-0.4, -0.6, 360, 7);
    let series = TimeSeries::new(TimePeriod::one_month(), data).unwrap();
    let order = ArimaOrder::seasonal(0, 1, 1, 0, 1, 1);
    let config = ArimaConfig::from_order(order);
    let model = ArimaModel::fit(&series, &config).unwrap();

    assert_eq!(model.seasonal_frequency(), 12);
    assert_eq!(model.differenced().len(), 360 - 13);
    let c = model.coefficients();
    assert!(c.mean().is_none());
    assert!((c.ma()[0] + 0.4).abs() < 0.2, "theta = {}", c.ma()[0]);
    assert!(
        (c.seasonal_ma()[0] + 0.6).abs() < 0.2,
        "seasonal theta = {}",
        c.seasonal_ma()[0]
    );
    assert!(model.sigma2() > 0.75 && model.sigma2() < 1.25);

    let fc = model.forecast(24, 0.05).unwrap();
    assert_eq!(fc.steps(), 24);
    assert!(fc.point().iter().all(|v| v.is_finite()));
    assert!(fc.std_errors().windows(2).all(|w| w[1] >= w[0]));
}

#[test]
fn drift_is_estimated_and_extrapolated() {
    let eps = noise(500, 11);
    let mut y = vec![50.0; 500];
    for t in 1..500 {
        y[t] = y[t - 1] + 0.5 + eps[t];
    }
    let series = TimeSeries::from_values(y.clone()).unwrap();
    let order = ArimaOrder::new(0, 1, 0).with_drift(true);
    let config = ArimaConfig::from_order(order).with_strategy(FittingStrategy::Css);
    let model = ArimaModel::fit(&series, &config).unwrap();

    // The least-squares drift of a random walk is the mean difference.
    let mean_diff = (y[499] - y[0]) / 499.0;
    let drift = model.coefficients().drift().unwrap();
    assert!((drift - mean_diff).abs() < 1e-3, "drift = {drift}");

    let fc = model.point_forecast(3).unwrap();
    for (h, f) in fc.iter().enumerate() {
        let expected = y[499] + drift * (h + 1) as f64;
        assert!((f - expected).abs() < 1e-9);
    }
}
