//! Weak-Wolfe line search by bracketing and bisection.
//!
//! **Not part of the public API.**

use ndarray::Array1;

use crate::error::OptimError;

/// Sufficient-decrease constant.
const C1: f64 = 1e-4;
/// Curvature constant.
const C2: f64 = 0.9;
/// Maximum number of trial steps per search.
const MAX_TRIALS: usize = 50;

/// An accepted step along the search direction.
#[derive(Debug, Clone)]
pub(crate) struct Step {
    pub(crate) alpha: f64,
    pub(crate) x: Array1<f64>,
    pub(crate) cost: f64,
    pub(crate) gradient: Array1<f64>,
}

/// Searches along `direction` from `x` for a step satisfying the weak Wolfe
/// conditions.
///
/// `slope` is the directional derivative `∇f(x)·d` and must be negative.
/// Trial points with a non-finite cost are treated as overshooting, so the
/// bracket shrinks back towards the admissible region. Returns `None` when
/// no trial achieves sufficient decrease.
pub(crate) fn weak_wolfe<C, G>(
    cost: &C,
    gradient: &G,
    x: &Array1<f64>,
    fx: f64,
    direction: &Array1<f64>,
    slope: f64,
) -> Result<Option<Step>, OptimError>
where
    C: Fn(&Array1<f64>) -> Result<f64, OptimError>,
    G: Fn(&Array1<f64>, f64) -> Result<Array1<f64>, OptimError>,
{
    let mut lo = 0.0;
    let mut hi = f64::INFINITY;
    let mut alpha = 1.0;
    let mut best: Option<Step> = None;

    for _ in 0..MAX_TRIALS {
        let trial = x + &(direction * alpha);
        let f_trial = cost(&trial)?;

        if !f_trial.is_finite() || f_trial > fx + C1 * alpha * slope {
            hi = alpha;
        } else {
            let g_trial = gradient(&trial, f_trial)?;
            let step = Step {
                alpha,
                x: trial,
                cost: f_trial,
                gradient: g_trial,
            };
            if step.gradient.dot(direction) < C2 * slope {
                lo = alpha;
                best = Some(step);
            } else {
                return Ok(Some(step));
            }
        }

        alpha = if hi.is_finite() {
            0.5 * (lo + hi)
        } else {
            2.0 * lo
        };
        if hi.is_finite() && hi - lo <= f64::EPSILON * hi {
            break;
        }
    }

    // Sufficient decrease without curvature is still progress.
    Ok(best)
}
