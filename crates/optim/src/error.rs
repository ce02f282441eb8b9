//! Error types for the tempest-optim crate.

/// Error type for all fallible operations in the tempest-optim crate.
///
/// Running out of iterations or being cancelled are not errors: both are
/// reported through [`Termination`](crate::Termination) on a successful
/// [`BfgsOutcome`](crate::BfgsOutcome).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptimError {
    /// Returned when an optimiser option is negative or not finite.
    #[error("invalid optimiser option {name}: {value}")]
    InvalidOption {
        /// Option name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Returned when the objective is not finite at the starting point.
    #[error("objective is not finite at the starting point (value {value})")]
    NonFiniteStart {
        /// Objective value at the starting point.
        value: f64,
    },

    /// Returned when a supplied gradient has the wrong length.
    #[error("gradient dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Number of parameters.
        expected: usize,
        /// Length of the gradient returned by the objective.
        got: usize,
    },

    /// Returned when the objective function itself reports an error.
    #[error("objective evaluation failed: {message}")]
    Objective {
        /// Rendered error chain from the objective.
        message: String,
    },
}

impl OptimError {
    pub(crate) fn objective(err: argmin::core::Error) -> Self {
        Self::Objective {
            message: format!("{err:#}"),
        }
    }
}
