//! Error types for the tempest-arima crate.

use tempest_optim::OptimError;
use tempest_series::SeriesError;

/// Error type for all fallible operations in the tempest-arima crate.
///
/// Structural problems (bad orders, short series) are detected before any
/// optimiser iteration runs. Inadmissible coefficient candidates met during
/// optimisation never surface here; they are absorbed by the objective.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ArimaError {
    /// Returned when the model order or its coefficients are malformed.
    #[error("invalid model order: {reason}")]
    InvalidOrder {
        /// What is wrong with the order.
        reason: String,
    },

    /// Returned when the series is too short for the differencing and the
    /// number of coefficients requested.
    #[error("insufficient data: got {n} observations, need at least {min}")]
    InsufficientData {
        /// Number of observations provided.
        n: usize,
        /// Minimum number of observations required.
        min: usize,
    },

    /// Returned by [`ArimaModel::ensure_converged`](crate::ArimaModel::ensure_converged)
    /// when the optimiser exhausted its iteration budget.
    #[error("optimisation did not converge after {iterations} iterations")]
    NonConvergence {
        /// Iterations spent before giving up.
        iterations: usize,
    },

    /// Returned when a fit is cancelled through its
    /// [`CancelToken`](tempest_optim::CancelToken).
    #[error("fit interrupted after {iterations} iterations")]
    Interrupted {
        /// Iterations completed across all optimisation phases.
        iterations: usize,
        /// Best coefficient vector reached, in the standard layout.
        best: Vec<f64>,
    },

    /// Returned when a forecast significance level is outside `(0, 1)`.
    #[error("invalid significance level {alpha} (must be strictly between 0 and 1)")]
    InvalidAlpha {
        /// Requested significance level.
        alpha: f64,
    },

    /// Time-series construction failed.
    #[error(transparent)]
    Series(#[from] SeriesError),

    /// The optimiser rejected its input.
    #[error(transparent)]
    Optim(#[from] OptimError),
}

impl ArimaError {
    pub(crate) fn invalid_order(reason: impl Into<String>) -> Self {
        Self::InvalidOrder {
            reason: reason.into(),
        }
    }
}
