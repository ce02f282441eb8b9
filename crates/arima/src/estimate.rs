//! Fitting pipeline: differencing, optimisation, final statistics.
//!
//! ```text
//! validate ─▶ difference ─▶ start values ─▶ [CSS] ─▶ [ML] ─▶ finalise
//!                                  │            cancelled ─▶ Interrupted
//!                                  └─ fixed coefficients ───────▶ finalise
//! ```
//!
//! **Not part of the public API.**

use argmin::core::CostFunction;
use ndarray::{Array1, Array2};
use tempest_optim::{Bfgs, Termination, finite_diff, linalg};
use tempest_series::TimeSeries;
use tracing::{debug, info, warn};

use crate::coefficients::ArimaCoefficients;
use crate::config::{ArimaConfig, FittingStrategy, ModelSpec};
use crate::difference::Differencer;
use crate::error::ArimaError;
use crate::model::{ArimaModel, FitStatus};
use crate::objective::{self, Evaluator, Objective, Split};
use crate::poly;

/// Per-coordinate scale factors: the optimiser works on `β / factor`.
///
/// ARMA coordinates are unscaled. Regression coordinates are scaled by ten
/// least-squares standard errors so all coordinates move on a similar scale.
#[derive(Debug, Clone)]
struct Scaling {
    factors: Vec<f64>,
}

impl Scaling {
    fn scale(&self, coefficients: &[f64]) -> Array1<f64> {
        coefficients
            .iter()
            .zip(&self.factors)
            .map(|(b, c)| b / c)
            .collect()
    }

    fn unscale(&self, x: &Array1<f64>) -> Vec<f64> {
        x.iter().zip(&self.factors).map(|(v, c)| v * c).collect()
    }

    /// Maps an inverse Hessian of the per-observation objective in scaled
    /// coordinates to a coefficient covariance matrix.
    fn covariance(&self, inverse_hessian: &Array2<f64>, n_used: f64) -> Array2<f64> {
        let k = self.factors.len();
        Array2::from_shape_fn((k, k), |(i, j)| {
            inverse_hessian[[i, j]] * self.factors[i] * self.factors[j] / n_used
        })
    }
}

/// Objective seen by the optimiser: the negative concentrated
/// log-likelihood per observation, up to constants.
fn per_observation(objective: Objective, value: f64, n_used: f64) -> f64 {
    match objective {
        Objective::Css => 0.5 * (value / n_used).ln(),
        Objective::Ml => value / n_used,
    }
}

/// One optimisation phase as an `argmin` problem.
struct Phase<'a> {
    evaluator: &'a Evaluator,
    objective: Objective,
    scaling: &'a Scaling,
    n_used: f64,
}

impl Phase<'_> {
    fn cost_of(&self, x: &Array1<f64>) -> Result<f64, ArimaError> {
        let coefficients = self.scaling.unscale(x);
        let evaluation = self.evaluator.evaluate(&coefficients, self.objective)?;
        Ok(per_observation(self.objective, evaluation.value, self.n_used))
    }
}

impl CostFunction for Phase<'_> {
    type Param = Array1<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        Ok(self.cost_of(x)?)
    }
}

#[tracing::instrument(
    skip_all,
    fields(order = %config.spec().order(), strategy = config.strategy().name(), n = series.len())
)]
pub(crate) fn fit(series: &TimeSeries, config: &ArimaConfig) -> Result<ArimaModel, ArimaError> {
    config.validate()?;
    let order = config.spec().order();
    let period = series.seasonal_frequency(&config.seasonal_cycle());
    order.validate(period)?;

    let differencer = Differencer::for_order(&order, period);
    let n = series.len();
    let conditioning = order.p() + period * order.seasonal_p();
    let min = differencer.loss() + conditioning + order.n_coefficients() + 1;
    if n < min {
        return Err(ArimaError::InsufficientData { n, min });
    }

    let differenced = differencer.apply(series.as_slice())?;
    let time: Vec<f64> = (1..=n).map(|t| t as f64).collect();
    let drift_regressor = differencer.apply(&time)?;
    let evaluator = Evaluator::new(differenced, drift_regressor, order, period);
    let final_objective = match config.strategy() {
        FittingStrategy::Css => Objective::Css,
        FittingStrategy::Ml | FittingStrategy::CssMl => Objective::Ml,
    };

    let estimate = match config.spec() {
        ModelSpec::Coefficients(fixed) => {
            debug!("evaluating fixed coefficients");
            let values = fixed.to_vec();
            if !evaluator.is_admissible(&values)? {
                return Err(ArimaError::invalid_order(
                    "fixed coefficients are not stationary and invertible",
                ));
            }
            let scaling = Scaling {
                factors: vec![1.0; values.len()],
            };
            let covariance = hessian_covariance(&evaluator, &values, final_objective, &scaling)?;
            Estimate {
                coefficients: values,
                covariance,
                status: FitStatus::Evaluated,
            }
        }
        ModelSpec::Order(_) => optimise(&evaluator, config)?,
    };

    finalise(series, config, evaluator, differencer, estimate, final_objective)
}

struct Estimate {
    coefficients: Vec<f64>,
    covariance: Array2<f64>,
    status: FitStatus,
}

/// Least-squares start values and scale factors for the regression terms,
/// in layout order (drift, then mean).
fn regression_start(evaluator: &Evaluator) -> (Vec<f64>, Vec<f64>) {
    let order = evaluator.order();
    let ones = vec![1.0; evaluator.differenced().len()];
    let mut columns: Vec<&[f64]> = Vec::new();
    if order.drift() {
        columns.push(evaluator.drift_regressor());
    }
    if order.constant() {
        columns.push(&ones);
    }
    if columns.is_empty() {
        return (Vec::new(), Vec::new());
    }

    match tempest_stats::least_squares(&columns, evaluator.differenced()) {
        Some(ls) => {
            let factors = ls
                .std_errors
                .iter()
                .map(|&se| if se > 0.0 && se.is_finite() { 10.0 * se } else { 1.0 })
                .collect();
            (ls.coefficients, factors)
        }
        None => {
            debug!("least-squares start failed; starting regression terms at the mean");
            let mut start = Vec::new();
            if order.drift() {
                start.push(0.0);
            }
            if order.constant() {
                start.push(tempest_stats::mean(evaluator.differenced()));
            }
            let factors = vec![1.0; start.len()];
            (start, factors)
        }
    }
}

/// Zeroes the ARMA part of `start` if it is inadmissible.
fn admissible_start(
    evaluator: &Evaluator,
    mut start: Vec<f64>,
    objective: Objective,
) -> Result<Vec<f64>, ArimaError> {
    if evaluator.evaluate(&start, objective)?.is_admissible() {
        return Ok(start);
    }
    warn!(
        ?objective,
        "starting point is inadmissible; resetting ARMA coefficients to zero"
    );
    let n_arma = evaluator.order().n_arma();
    start[..n_arma].fill(0.0);
    Ok(start)
}

fn optimise(evaluator: &Evaluator, config: &ArimaConfig) -> Result<Estimate, ArimaError> {
    let order = evaluator.order();
    let k = order.n_coefficients();
    let (regression, regression_factors) = regression_start(evaluator);

    let mut factors = vec![1.0; order.n_arma()];
    factors.extend(regression_factors);
    let scaling = Scaling { factors };

    let mut current = match config.start() {
        Some(start) => start.to_vec(),
        None => {
            let mut start = vec![0.0; order.n_arma()];
            start.extend(regression);
            start
        }
    };

    let differenced = evaluator.differenced();
    let lowest = differenced.iter().copied().fold(f64::INFINITY, f64::min);
    let highest = differenced.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if highest - lowest == 0.0 {
        warn!("differenced series is constant; skipping optimisation");
        return Ok(Estimate {
            coefficients: current,
            covariance: Array2::from_elem((k, k), f64::NAN),
            status: FitStatus::Converged { iterations: 0 },
        });
    }

    let phases: &[Objective] = match config.strategy() {
        FittingStrategy::Css => &[Objective::Css],
        FittingStrategy::Ml => &[Objective::Ml],
        FittingStrategy::CssMl => &[Objective::Css, Objective::Ml],
    };

    let bfgs = Bfgs::new(*config.optimizer());
    let mut total_iterations = 0;
    let mut converged = true;
    let mut covariance = Array2::from_elem((k, k), f64::NAN);

    for &objective in phases {
        current = admissible_start(evaluator, current, objective)?;
        let n_used = evaluator.n_used(objective) as f64;
        let phase = Phase {
            evaluator,
            objective,
            scaling: &scaling,
            n_used,
        };

        let outcome = bfgs.minimize(&phase, scaling.scale(&current), config.cancel_token())?;
        total_iterations += outcome.iterations();
        if outcome.iterations() > 0 {
            current = scaling.unscale(outcome.argmin());
        }

        if outcome.termination() == Termination::Cancelled {
            warn!(iterations = total_iterations, "fit interrupted");
            return Err(ArimaError::Interrupted {
                iterations: total_iterations,
                best: current,
            });
        }
        debug!(
            ?objective,
            iterations = outcome.iterations(),
            cost = outcome.cost(),
            termination = %outcome.termination(),
            "optimisation phase finished"
        );
        converged = outcome.is_converged();

        // The BFGS approximation has seen curvature in every direction only
        // after at least k updates.
        covariance = if outcome.iterations() >= k {
            scaling.covariance(outcome.inverse_hessian(), n_used)
        } else {
            hessian_covariance(evaluator, &current, objective, &scaling)?
        };
    }

    let status = if converged {
        FitStatus::Converged {
            iterations: total_iterations,
        }
    } else {
        warn!(
            iterations = total_iterations,
            "optimiser exhausted its iteration budget"
        );
        FitStatus::NotConverged {
            iterations: total_iterations,
        }
    };

    Ok(Estimate {
        coefficients: current,
        covariance,
        status,
    })
}

/// Covariance from a finite-difference Hessian of the per-observation
/// objective. Entries are NaN if the Hessian is not positive definite.
fn hessian_covariance(
    evaluator: &Evaluator,
    coefficients: &[f64],
    objective: Objective,
    scaling: &Scaling,
) -> Result<Array2<f64>, ArimaError> {
    let k = coefficients.len();
    let n_used = evaluator.n_used(objective) as f64;
    let phase = Phase {
        evaluator,
        objective,
        scaling,
        n_used,
    };
    let hessian = finite_diff::hessian(|x| phase.cost_of(x), &scaling.scale(coefficients))?;
    Ok(match linalg::invert_spd(&hessian) {
        Some(inverse) => scaling.covariance(&inverse, n_used),
        None => {
            debug!("Hessian is not positive definite; standard errors unavailable");
            Array2::from_elem((k, k), f64::NAN)
        }
    })
}

fn finalise(
    series: &TimeSeries,
    config: &ArimaConfig,
    evaluator: Evaluator,
    differencer: Differencer,
    estimate: Estimate,
    final_objective: Objective,
) -> Result<ArimaModel, ArimaError> {
    let order = *evaluator.order();
    let evaluation = evaluator.evaluate(&estimate.coefficients, final_objective)?;

    let split = Split::new(&order, &estimate.coefficients);
    let period = differencer.period();
    let phi = poly::expand_ar(split.ar, split.seasonal_ar, period);
    let theta = poly::expand_ma(split.ma, split.seasonal_ma, period);
    let innovations = objective::conditional_residuals(
        &evaluator.demeaned(&split),
        &phi,
        &theta,
        evaluator.conditioning(),
    );

    let mut residuals = vec![0.0; differencer.loss()];
    residuals.extend_from_slice(&evaluation.residuals);
    let fitted = series
        .as_slice()
        .iter()
        .zip(&residuals)
        .map(|(y, e)| y - e)
        .collect();

    let std_errors = estimate.covariance.diag().iter().map(|v| v.sqrt()).collect();
    let coefficients = ArimaCoefficients::from_slice(&order, &estimate.coefficients)?;

    let model = ArimaModel {
        series: series.clone(),
        order,
        strategy: config.strategy(),
        seasonal_frequency: period,
        coefficients,
        std_errors,
        covariance: estimate.covariance,
        sigma2: evaluation.sigma2,
        log_likelihood: evaluation.log_likelihood,
        n_used: evaluation.n_used,
        residuals,
        fitted,
        differenced: evaluator.differenced().to_vec(),
        innovations,
        status: estimate.status,
    };
    info!(
        sigma2 = model.sigma2(),
        log_likelihood = model.log_likelihood(),
        aic = model.aic(),
        status = ?model.status(),
        "fit complete"
    );
    Ok(model)
}
