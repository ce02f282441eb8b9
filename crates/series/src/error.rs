//! Error types for the tempest-series crate.

/// Error type for all fallible operations in the tempest-series crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    /// Returned when a period is constructed with a zero length.
    #[error("invalid period length: {length} (must be at least 1)")]
    InvalidPeriodLength {
        /// The invalid length that was provided.
        length: u32,
    },

    /// Returned when a series is constructed without observations.
    #[error("time series has no observations")]
    EmptySeries,

    /// Returned when an observation is NaN or infinite.
    #[error("observation {index} is not finite")]
    NonFiniteObservation {
        /// Position of the first offending observation.
        index: usize,
    },

    /// Returned when a unit name cannot be parsed.
    #[error("unknown time unit: {name:?}")]
    UnknownUnit {
        /// The unrecognised name.
        name: String,
    },
}
