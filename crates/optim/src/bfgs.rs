//! BFGS quasi-Newton minimiser.

use std::cell::Cell;
use std::fmt;

use argmin::core::{CostFunction, Gradient};
use ndarray::{Array1, Array2};
use tracing::{debug, trace};

use crate::cancel::CancelToken;
use crate::error::OptimError;
use crate::finite_diff;
use crate::line_search;

/// Curvature threshold below which the secant update is skipped.
const CURVATURE_EPS: f64 = 1e-10;

/// Tolerances and budget for a [`Bfgs`] run.
///
/// | Option | Default | Meaning |
/// |--------|---------|---------|
/// | `gradient_tolerance` | `1e-8` | stop when `‖∇f‖∞ ≤ tol · max(1, |f|)` |
/// | `step_tolerance` | `1e-8` | stop when `‖Δx‖∞ ≤ tol · max(1, ‖x‖∞)` |
/// | `max_iterations` | `500` | iteration budget; `0` evaluates the start only |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BfgsOptions {
    gradient_tolerance: f64,
    step_tolerance: f64,
    max_iterations: usize,
}

impl Default for BfgsOptions {
    fn default() -> Self {
        Self {
            gradient_tolerance: 1e-8,
            step_tolerance: 1e-8,
            max_iterations: 500,
        }
    }
}

impl BfgsOptions {
    /// Creates options with the documented defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the relative gradient tolerance.
    pub fn with_gradient_tolerance(mut self, tolerance: f64) -> Self {
        self.gradient_tolerance = tolerance;
        self
    }

    /// Sets the relative step tolerance.
    pub fn with_step_tolerance(mut self, tolerance: f64) -> Self {
        self.step_tolerance = tolerance;
        self
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Relative gradient tolerance.
    pub fn gradient_tolerance(&self) -> f64 {
        self.gradient_tolerance
    }

    /// Relative step tolerance.
    pub fn step_tolerance(&self) -> f64 {
        self.step_tolerance
    }

    /// Iteration budget.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Checks that both tolerances are finite and non-negative.
    pub fn validate(&self) -> Result<(), OptimError> {
        for (name, value) in [
            ("gradient_tolerance", self.gradient_tolerance),
            ("step_tolerance", self.step_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(OptimError::InvalidOption { name, value });
            }
        }
        Ok(())
    }
}

/// Why a [`Bfgs`] run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// The scaled gradient norm fell below tolerance.
    GradientTolerance,
    /// The accepted step fell below tolerance.
    StepTolerance,
    /// The line search could not decrease the objective any further.
    NoFurtherProgress,
    /// The iteration budget was exhausted.
    MaxIterations,
    /// The [`CancelToken`] was tripped.
    Cancelled,
}

impl Termination {
    /// Returns `true` for the stopping rules that indicate a local minimum.
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            Self::GradientTolerance | Self::StepTolerance | Self::NoFurtherProgress
        )
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::GradientTolerance => "gradient tolerance reached",
            Self::StepTolerance => "step tolerance reached",
            Self::NoFurtherProgress => "no further progress possible",
            Self::MaxIterations => "iteration budget exhausted",
            Self::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

/// Result of a [`Bfgs`] run.
///
/// Always holds the best point visited; the objective decreases
/// monotonically, so this is also the last accepted point.
#[derive(Debug, Clone)]
pub struct BfgsOutcome {
    argmin: Array1<f64>,
    cost: f64,
    gradient: Array1<f64>,
    inverse_hessian: Array2<f64>,
    iterations: usize,
    cost_evaluations: usize,
    termination: Termination,
}

impl BfgsOutcome {
    /// Best parameter vector found.
    pub fn argmin(&self) -> &Array1<f64> {
        &self.argmin
    }

    /// Consumes the outcome, returning the best parameter vector.
    pub fn into_argmin(self) -> Array1<f64> {
        self.argmin
    }

    /// Objective value at [`argmin`](Self::argmin).
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Gradient at [`argmin`](Self::argmin).
    pub fn gradient(&self) -> &Array1<f64> {
        &self.gradient
    }

    /// Final inverse-Hessian approximation.
    pub fn inverse_hessian(&self) -> &Array2<f64> {
        &self.inverse_hessian
    }

    /// Number of completed iterations.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Number of objective evaluations, finite-difference probes included.
    pub fn cost_evaluations(&self) -> usize {
        self.cost_evaluations
    }

    /// Why the run stopped.
    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Shorthand for `termination().is_converged()`.
    pub fn is_converged(&self) -> bool {
        self.termination.is_converged()
    }
}

/// BFGS minimiser over `ndarray` vectors.
///
/// Works with any `argmin` problem whose parameter type is `Array1<f64>`.
/// Non-finite objective values are treated as lying outside the feasible
/// region: the line search backs off from them instead of failing.
///
/// ```ignore
/// let outcome = Bfgs::new(BfgsOptions::new()).minimize(&problem, x0, &CancelToken::new())?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Bfgs {
    options: BfgsOptions,
}

impl Bfgs {
    /// Creates a minimiser with the given options.
    pub fn new(options: BfgsOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &BfgsOptions {
        &self.options
    }

    /// Minimises `problem` from `x0` using central finite-difference gradients.
    pub fn minimize<P>(
        &self,
        problem: &P,
        x0: Array1<f64>,
        cancel: &CancelToken,
    ) -> Result<BfgsOutcome, OptimError>
    where
        P: CostFunction<Param = Array1<f64>, Output = f64>,
    {
        let evaluations = Cell::new(0usize);
        let cost = |x: &Array1<f64>| {
            evaluations.set(evaluations.get() + 1);
            problem.cost(x).map_err(OptimError::objective)
        };
        let gradient = |x: &Array1<f64>, fx: f64| finite_diff::gradient(&cost, x, fx);
        self.run(&cost, &gradient, x0, cancel, &evaluations)
    }

    /// Minimises `problem` from `x0` using its closed-form gradient.
    pub fn minimize_with_gradient<P>(
        &self,
        problem: &P,
        x0: Array1<f64>,
        cancel: &CancelToken,
    ) -> Result<BfgsOutcome, OptimError>
    where
        P: CostFunction<Param = Array1<f64>, Output = f64>
            + Gradient<Param = Array1<f64>, Gradient = Array1<f64>>,
    {
        let evaluations = Cell::new(0usize);
        let cost = |x: &Array1<f64>| {
            evaluations.set(evaluations.get() + 1);
            problem.cost(x).map_err(OptimError::objective)
        };
        let gradient = |x: &Array1<f64>, _fx: f64| -> Result<Array1<f64>, OptimError> {
            let g = problem.gradient(x).map_err(OptimError::objective)?;
            if g.len() != x.len() {
                return Err(OptimError::DimensionMismatch {
                    expected: x.len(),
                    got: g.len(),
                });
            }
            Ok(g)
        };
        self.run(&cost, &gradient, x0, cancel, &evaluations)
    }

    fn run<C, G>(
        &self,
        cost: &C,
        gradient: &G,
        x0: Array1<f64>,
        cancel: &CancelToken,
        evaluations: &Cell<usize>,
    ) -> Result<BfgsOutcome, OptimError>
    where
        C: Fn(&Array1<f64>) -> Result<f64, OptimError>,
        G: Fn(&Array1<f64>, f64) -> Result<Array1<f64>, OptimError>,
    {
        self.options.validate()?;
        let n = x0.len();

        let mut x = x0;
        let mut fx = cost(&x)?;
        if !fx.is_finite() {
            return Err(OptimError::NonFiniteStart { value: fx });
        }
        let mut g = gradient(&x, fx)?;
        let mut h = scaled_identity(n, &g);
        let mut updated = false;
        let mut iterations = 0;

        let termination = loop {
            if n == 0 || inf_norm(&g) <= self.options.gradient_tolerance * fx.abs().max(1.0) {
                break Termination::GradientTolerance;
            }
            if iterations >= self.options.max_iterations {
                break Termination::MaxIterations;
            }
            if cancel.is_cancelled() {
                debug!(iterations, cost = fx, "minimisation cancelled");
                break Termination::Cancelled;
            }

            let mut direction = -h.dot(&g);
            let mut slope = g.dot(&direction);
            if !(slope < 0.0) {
                debug!(
                    iterations,
                    "search direction is not descending; resetting inverse Hessian"
                );
                h = scaled_identity(n, &g);
                updated = false;
                direction = -h.dot(&g);
                slope = g.dot(&direction);
            }

            let Some(step) = line_search::weak_wolfe(cost, gradient, &x, fx, &direction, slope)?
            else {
                break Termination::NoFurtherProgress;
            };
            iterations += 1;

            let s = &step.x - &x;
            let y = &step.gradient - &g;
            let step_norm = inf_norm(&s);
            let x_scale = inf_norm(&x).max(1.0);

            x = step.x;
            fx = step.cost;
            g = step.gradient;
            trace!(
                iterations,
                cost = fx,
                alpha = step.alpha,
                grad_norm = inf_norm(&g),
                "bfgs iteration"
            );

            update_inverse_hessian(&mut h, &s, &y, &mut updated, iterations);

            if step_norm <= self.options.step_tolerance * x_scale {
                break Termination::StepTolerance;
            }
        };

        debug!(
            iterations,
            cost = fx,
            evaluations = evaluations.get(),
            %termination,
            "bfgs finished"
        );

        Ok(BfgsOutcome {
            argmin: x,
            cost: fx,
            gradient: g,
            inverse_hessian: h,
            iterations,
            cost_evaluations: evaluations.get(),
            termination,
        })
    }
}

/// `I / max(1, ‖g‖₂)`.
fn scaled_identity(n: usize, g: &Array1<f64>) -> Array2<f64> {
    let norm = g.dot(g).sqrt();
    Array2::eye(n) / norm.max(1.0)
}

fn inf_norm(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}

/// Rank-two BFGS update of the inverse Hessian `h` with step `s` and
/// gradient change `y`. Skipped when the curvature `yᵀs` is not safely
/// positive, which leaves `h` positive definite.
fn update_inverse_hessian(
    h: &mut Array2<f64>,
    s: &Array1<f64>,
    y: &Array1<f64>,
    updated: &mut bool,
    iteration: usize,
) {
    let ys = y.dot(s);
    let s_norm = s.dot(s).sqrt();
    let y_norm = y.dot(y).sqrt();
    if !(ys > CURVATURE_EPS * s_norm * y_norm) || !ys.is_finite() {
        debug!(iteration, ys, "skipping BFGS update: curvature condition violated");
        return;
    }

    if !*updated {
        // Shanno-Phua scaling of the initial matrix.
        let n = s.len();
        *h = Array2::eye(n) * (ys / y.dot(y));
        *updated = true;
    }

    let rho = 1.0 / ys;
    let hy = h.dot(y);
    let yhy = y.dot(&hy);
    let n = s.len();
    for i in 0..n {
        for j in 0..n {
            h[[i, j]] += (ys + yhy) * rho * rho * s[i] * s[j] - rho * (hy[i] * s[j] + s[i] * hy[j]);
        }
    }
}
