//! Finite-difference gradients and Hessians.
//!
//! Both helpers take the objective as a fallible closure so errors raised by
//! the objective propagate instead of being folded into the derivative.
//! Non-finite objective values (an objective's way of saying "outside the
//! admissible region") are handled by falling back to one-sided differences.

use ndarray::{Array1, Array2};

/// Relative step for first derivatives, `ε^(1/3)`.
fn gradient_step(x: f64) -> f64 {
    f64::EPSILON.cbrt() * x.abs().max(1.0)
}

/// Relative step for second derivatives, `ε^(1/4)`.
fn hessian_step(x: f64) -> f64 {
    f64::EPSILON.powf(0.25) * x.abs().max(1.0)
}

/// Central-difference gradient of `f` at `x`, where `fx = f(x)`.
///
/// When one side of the central difference is not finite the other side is
/// used as a one-sided difference. If neither side is finite the component
/// is set to zero, which keeps the search away from that coordinate.
pub fn gradient<F, E>(f: F, x: &Array1<f64>, fx: f64) -> Result<Array1<f64>, E>
where
    F: Fn(&Array1<f64>) -> Result<f64, E>,
{
    let mut grad = Array1::zeros(x.len());
    let mut probe = x.clone();
    for i in 0..x.len() {
        let h = gradient_step(x[i]);

        probe[i] = x[i] + h;
        let f_plus = f(&probe)?;
        probe[i] = x[i] - h;
        let f_minus = f(&probe)?;
        probe[i] = x[i];

        grad[i] = match (f_plus.is_finite(), f_minus.is_finite()) {
            (true, true) => (f_plus - f_minus) / (2.0 * h),
            (true, false) => (f_plus - fx) / h,
            (false, true) => (fx - f_minus) / h,
            (false, false) => 0.0,
        };
    }
    Ok(grad)
}

/// Central-difference Hessian of `f` at `x`.
///
/// Uses the four-point stencil
/// `[f(x+hᵢ+hⱼ) − f(x+hᵢ−hⱼ) − f(x−hᵢ+hⱼ) + f(x−hᵢ−hⱼ)] / (4hᵢhⱼ)`
/// and returns an exactly symmetric matrix. Entries whose stencil touches a
/// non-finite value are left non-finite for the caller to detect.
pub fn hessian<F, E>(f: F, x: &Array1<f64>) -> Result<Array2<f64>, E>
where
    F: Fn(&Array1<f64>) -> Result<f64, E>,
{
    let n = x.len();
    let steps: Vec<f64> = x.iter().map(|&v| hessian_step(v)).collect();
    let mut hess = Array2::zeros((n, n));
    let mut probe = x.clone();

    let eval = |probe: &mut Array1<f64>, i: usize, si: f64, j: usize, sj: f64| {
        probe[i] += si * steps[i];
        probe[j] += sj * steps[j];
        let value = f(probe);
        probe[i] = x[i];
        probe[j] = x[j];
        value
    };

    for i in 0..n {
        for j in 0..=i {
            let pp = eval(&mut probe, i, 1.0, j, 1.0)?;
            let pm = eval(&mut probe, i, 1.0, j, -1.0)?;
            let mp = eval(&mut probe, i, -1.0, j, 1.0)?;
            let mm = eval(&mut probe, i, -1.0, j, -1.0)?;
            let value = (pp - pm - mp + mm) / (4.0 * steps[i] * steps[j]);
            hess[[i, j]] = value;
            hess[[j, i]] = value;
        }
    }
    Ok(hess)
}
