//! End-to-end minimisation tests against classic test functions.

use approx::assert_abs_diff_eq;
use argmin::core::{CostFunction, Executor, Gradient};
use argmin::solver::neldermead::NelderMead;
use ndarray::{Array1, array};
use tempest_optim::{Bfgs, BfgsOptions, CancelToken, Termination};

struct Rosenbrock;

impl CostFunction for Rosenbrock {
    type Param = Array1<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        Ok((1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2))
    }
}

impl Gradient for Rosenbrock {
    type Param = Array1<f64>;
    type Gradient = Array1<f64>;

    fn gradient(&self, x: &Self::Param) -> Result<Self::Gradient, argmin::core::Error> {
        Ok(array![
            -2.0 * (1.0 - x[0]) - 400.0 * x[0] * (x[1] - x[0] * x[0]),
            200.0 * (x[1] - x[0] * x[0]),
        ])
    }
}

/// Same function over `Vec<f64>` for argmin's Nelder-Mead.
struct RosenbrockVec;

impl CostFunction for RosenbrockVec {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        Rosenbrock.cost(&Array1::from(x.clone()))
    }
}

/// A barrier-style objective that is infinite outside the unit disc.
struct DiscQuadratic;

impl CostFunction for DiscQuadratic {
    type Param = Array1<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let r2 = x.dot(x);
        if r2 >= 1.0 {
            return Ok(f64::INFINITY);
        }
        Ok((x[0] - 0.5).powi(2) + (x[1] + 0.25).powi(2))
    }
}

#[test]
fn rosenbrock_with_analytic_gradient() {
    let outcome = Bfgs::default()
        .minimize_with_gradient(&Rosenbrock, array![-1.2, 1.0], &CancelToken::new())
        .unwrap();
    assert!(outcome.is_converged(), "{}", outcome.termination());
    assert_abs_diff_eq!(outcome.argmin()[0], 1.0, epsilon = 1e-4);
    assert_abs_diff_eq!(outcome.argmin()[1], 1.0, epsilon = 1e-4);
}

#[test]
fn rosenbrock_with_finite_differences() {
    let outcome = Bfgs::default()
        .minimize(&Rosenbrock, array![0.5, 1.5], &CancelToken::new())
        .unwrap();
    assert!(outcome.is_converged(), "{}", outcome.termination());
    assert_abs_diff_eq!(outcome.argmin()[0], 1.0, epsilon = 1e-3);
    assert_abs_diff_eq!(outcome.argmin()[1], 1.0, epsilon = 1e-3);
    assert!(outcome.cost_evaluations() > outcome.iterations());
}

#[test]
fn agrees_with_nelder_mead() {
    let simplex = vec![vec![0.5, 1.5], vec![0.9, 1.5], vec![0.5, 1.9]];
    let solver = NelderMead::new(simplex).with_sd_tolerance(1e-12).unwrap();
    let result = Executor::new(RosenbrockVec, solver)
        .configure(|state| state.max_iters(5000))
        .run()
        .unwrap();
    let reference = result.state().best_param.clone().unwrap();

    let outcome = Bfgs::default()
        .minimize(&Rosenbrock, array![0.5, 1.5], &CancelToken::new())
        .unwrap();
    assert_abs_diff_eq!(outcome.argmin()[0], reference[0], epsilon = 1e-3);
    assert_abs_diff_eq!(outcome.argmin()[1], reference[1], epsilon = 1e-3);
}

#[test]
fn infinite_barrier_is_respected() {
    let outcome = Bfgs::default()
        .minimize(&DiscQuadratic, array![0.0, 0.0], &CancelToken::new())
        .unwrap();
    assert!(outcome.is_converged(), "{}", outcome.termination());
    assert!(outcome.cost().is_finite());
    assert_abs_diff_eq!(outcome.argmin()[0], 0.5, epsilon = 1e-5);
    assert_abs_diff_eq!(outcome.argmin()[1], -0.25, epsilon = 1e-5);
}

#[test]
fn budget_exhaustion_keeps_best_point() {
    let opts = BfgsOptions::new().with_max_iterations(3);
    let start = array![-1.2, 1.0];
    let f0 = Rosenbrock.cost(&start).unwrap();
    let outcome = Bfgs::new(opts)
        .minimize(&Rosenbrock, start, &CancelToken::new())
        .unwrap();
    assert_eq!(outcome.termination(), Termination::MaxIterations);
    assert_eq!(outcome.iterations(), 3);
    assert!(outcome.cost() < f0);
}

#[test]
fn cancellation_mid_run_stops_promptly() {
    /// Objective that trips the token after a fixed number of calls.
    struct Tripwire {
        cancel: CancelToken,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl CostFunction for Tripwire {
        type Param = Array1<f64>;
        type Output = f64;

        fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
            let calls = self
                .calls
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            if calls == 20 {
                self.cancel.cancel();
            }
            Rosenbrock.cost(x)
        }
    }

    let cancel = CancelToken::new();
    let problem = Tripwire {
        cancel: cancel.clone(),
        calls: Default::default(),
    };
    let outcome = Bfgs::default()
        .minimize(&problem, array![-1.2, 1.0], &cancel)
        .unwrap();
    assert_eq!(outcome.termination(), Termination::Cancelled);
    assert!(outcome.iterations() < 20);
    assert!(outcome.cost().is_finite());
}
