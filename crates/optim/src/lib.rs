//! # tempest-optim
//!
//! General-purpose BFGS quasi-Newton minimisation over `ndarray` vectors,
//! with finite-difference derivatives and cooperative cancellation.
//!
//! ```mermaid
//! graph LR
//!     A["BfgsOptions::new()"] -->|"Bfgs::new(opts)"| B["Bfgs"]
//!     B -->|".minimize(&problem, x0, &cancel)?"| C["BfgsOutcome"]
//!     C --> D[".argmin() / .cost()"]
//!     C --> E[".inverse_hessian()"]
//!     C --> F[".termination()"]
//!     G["CancelToken::cancel()"] -.->|"polled once per iteration"| B
//! ```
//!
//! Problems implement `argmin`'s [`CostFunction`](argmin::core::CostFunction)
//! (and optionally [`Gradient`](argmin::core::Gradient)) with
//! `Param = Array1<f64>`. Hitting the iteration budget or being cancelled
//! is reported through [`Termination`], never as an error, so the best
//! point is always available to the caller.
//!
//! | Module | Contents |
//! |--------|----------|
//! | `bfgs` | [`Bfgs`], [`BfgsOptions`], [`BfgsOutcome`], [`Termination`] |
//! | `cancel` | [`CancelToken`] |
//! | [`finite_diff`] | central-difference gradient and Hessian |
//! | [`linalg`] | Cholesky factorisation and SPD inverse |

mod bfgs;
mod cancel;
mod error;
mod line_search;

pub mod finite_diff;
pub mod linalg;

pub use bfgs::{Bfgs, BfgsOptions, BfgsOutcome, Termination};
pub use cancel::CancelToken;
pub use error::OptimError;
