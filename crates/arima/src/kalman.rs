//! Kalman filter for exact ARMA likelihood evaluation.
//!
//! Runs the prediction-error decomposition over the state space from
//! [`crate::state_space`], started from the stationary state covariance.
//! Costs `O(n r³)` until the state covariance settles, `O(n r²)` after.
//!
//! **Not part of the public API.**

use ndarray::Array2;

use crate::state_space::{StateSpace, max_abs};

/// Covariance change below which the filter is treated as steady.
const STEADY_STATE_TOL: f64 = 1e-12;

/// One-step prediction errors `vₜ` and their variances `Fₜ` (units of σ²).
#[derive(Debug, Clone)]
pub(crate) struct Innovations {
    pub(crate) errors: Vec<f64>,
    pub(crate) variances: Vec<f64>,
}

impl Innovations {
    /// `Σ vₜ² / Fₜ`.
    pub(crate) fn weighted_sum_of_squares(&self) -> f64 {
        self.errors
            .iter()
            .zip(&self.variances)
            .map(|(v, f)| v * v / f)
            .sum()
    }

    /// `Σ ln Fₜ`.
    pub(crate) fn log_det(&self) -> f64 {
        self.variances.iter().map(|f| f.ln()).sum()
    }
}

/// Filters `w` through `ss`, starting from the zero mean state and
/// covariance `initial`.
///
/// Returns `None` if a prediction variance is not positive and finite.
pub(crate) fn filter(ss: &StateSpace, initial: Array2<f64>, w: &[f64]) -> Option<Innovations> {
    let r = ss.r();
    let t = ss.transition();
    let mut state = ndarray::Array1::<f64>::zeros(r);
    let mut cov = initial;
    let mut steady = false;

    let mut errors = Vec::with_capacity(w.len());
    let mut variances = Vec::with_capacity(w.len());

    for &obs in w {
        let v = obs - state[0];
        let f = cov[[0, 0]];
        if !(f > 0.0) || !f.is_finite() {
            return None;
        }
        errors.push(v);
        variances.push(f);

        // Update: a + P Z v / F, with Z = e₁.
        let gain = cov.column(0).to_owned() / f;
        let updated_state = &state + &(&gain * v);
        state = t.dot(&updated_state);

        if !steady {
            // P − P Z Z' P / F, then T P Tᵀ + R Rᵀ.
            let pz = cov.column(0).to_owned();
            let mut updated = cov.clone();
            for i in 0..r {
                for j in 0..r {
                    updated[[i, j]] -= pz[i] * pz[j] / f;
                }
            }
            let next = t.dot(&updated).dot(&t.t()) + ss.noise_outer();
            let change = max_abs(&(&next - &cov));
            steady = change < STEADY_STATE_TOL;
            cov = next;
        }
    }

    Some(Innovations { errors, variances })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn white_noise_innovations_are_the_data() {
        let ss = StateSpace::new(&[], &[]);
        let p0 = ss.stationary_covariance().unwrap();
        let w = [0.5, -1.0, 2.0];
        let out = filter(&ss, p0, &w).unwrap();
        assert_eq!(out.errors, w.to_vec());
        assert_eq!(out.variances, vec![1.0; 3]);
        assert_abs_diff_eq!(out.weighted_sum_of_squares(), 5.25, epsilon = 1e-12);
        assert_abs_diff_eq!(out.log_det(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn ar1_innovations() {
        // Exact AR(1): F₁ = 1/(1−φ²), then vₜ = wₜ − φ wₜ₋₁ with Fₜ = 1.
        let phi = 0.5;
        let ss = StateSpace::new(&[phi], &[]);
        let p0 = ss.stationary_covariance().unwrap();
        let w = [1.0, 2.0, -1.0];
        let out = filter(&ss, p0, &w).unwrap();
        assert_abs_diff_eq!(out.variances[0], 1.0 / 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(out.variances[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.errors[1], 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(out.errors[2], -2.0, epsilon = 1e-12);
    }

    #[test]
    fn ma1_variances_decrease_towards_one() {
        let ss = StateSpace::new(&[], &[0.7]);
        let p0 = ss.stationary_covariance().unwrap();
        let w = vec![0.0; 40];
        let out = filter(&ss, p0, &w).unwrap();
        assert_abs_diff_eq!(out.variances[0], 1.49, epsilon = 1e-12);
        for pair in out.variances.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-15);
        }
        assert_abs_diff_eq!(*out.variances.last().unwrap(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn degenerate_covariance_is_rejected() {
        let ss = StateSpace::new(&[0.5], &[]);
        assert!(filter(&ss, Array2::zeros((1, 1)), &[1.0]).is_none());
    }
}
