//! ARMA state-space representation (Harvey form).
//!
//! ```text
//! αₜ₊₁ = T αₜ + R εₜ        (transition)
//! wₜ   = Z' αₜ               (observation, Z = e₁)
//! ```
//!
//! `T` is the companion matrix with the AR coefficients in its first column,
//! `R = [1, θ₁, …, θ_q, 0, …]` and the state dimension is
//! `r = max(p, q + 1, 1)`. The innovation variance is concentrated out of
//! the likelihood, so all covariances here are in units of `σ²`.
//!
//! **Not part of the public API.**

use ndarray::{Array1, Array2, Axis};

/// Doubling steps before the stationary covariance is declared divergent.
const MAX_DOUBLINGS: usize = 64;

#[derive(Clone, Debug)]
pub(crate) struct StateSpace {
    r: usize,
    transition: Array2<f64>,
    noise_outer: Array2<f64>,
}

impl StateSpace {
    /// Builds the state space of `(1 − Σφᵢ Bⁱ) wₜ = (1 + Σθⱼ Bʲ) εₜ`.
    pub(crate) fn new(ar: &[f64], ma: &[f64]) -> Self {
        let p = ar.len();
        let q = ma.len();
        let r = p.max(q + 1).max(1);

        let mut transition = Array2::zeros((r, r));
        for (i, &phi) in ar.iter().enumerate() {
            transition[[i, 0]] = phi;
        }
        for i in 0..r - 1 {
            transition[[i, i + 1]] = 1.0;
        }

        let mut noise = Array1::<f64>::zeros(r);
        noise[0] = 1.0;
        for (j, &theta) in ma.iter().enumerate() {
            noise[j + 1] = theta;
        }

        let column = noise.view().insert_axis(Axis(1));
        let row = noise.view().insert_axis(Axis(0));
        let noise_outer = column.dot(&row);

        Self {
            r,
            transition,
            noise_outer,
        }
    }

    pub(crate) fn r(&self) -> usize {
        self.r
    }

    /// Transition matrix `T` (r×r).
    pub(crate) fn transition(&self) -> &Array2<f64> {
        &self.transition
    }

    /// `R·Rᵀ` (r×r).
    pub(crate) fn noise_outer(&self) -> &Array2<f64> {
        &self.noise_outer
    }

    /// Solves `P = T P Tᵀ + R Rᵀ` by the doubling algorithm.
    ///
    /// Returns `None` if the iteration does not settle, which happens when
    /// `T` has an eigenvalue on or outside the unit circle.
    pub(crate) fn stationary_covariance(&self) -> Option<Array2<f64>> {
        let mut cov = self.noise_outer.clone();
        let mut power = self.transition.clone();
        for _ in 0..MAX_DOUBLINGS {
            let increment = power.dot(&cov).dot(&power.t());
            let size = max_abs(&increment);
            if !size.is_finite() {
                return None;
            }
            cov += &increment;
            if size <= 1e-15 * max_abs(&cov).max(1.0) {
                return Some(cov);
            }
            power = power.dot(&power);
        }
        None
    }
}

pub(crate) fn max_abs(m: &Array2<f64>) -> f64 {
    m.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}
