//! # tempest-series
//!
//! Sampling periods and the read-only observation container consumed by the
//! ARIMA engine.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["TimeUnit"] -->|"TimePeriod::new(unit, length)"| B["TimePeriod"]
//!     B -->|"TimeSeries::new(period, values)"| C["TimeSeries"]
//!     C -->|".seasonal_frequency(&cycle)"| D["observations per cycle"]
//!     B -->|".frequency_per(&cycle)"| D
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use tempest_series::{TimePeriod, TimeSeries};
//!
//! let series = TimeSeries::new(TimePeriod::one_month(), vec![1.0, 2.0, 3.0]).unwrap();
//! assert_eq!(series.seasonal_frequency(&TimePeriod::one_year()), 12);
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `unit` | Calendar and clock units with estimated durations |
//! | `period` | A unit multiplied by a positive length |
//! | `series` | Observations sampled at a fixed period |
//! | `error` | Error types |

mod error;
mod period;
mod series;
mod unit;

pub use error::SeriesError;
pub use period::TimePeriod;
pub use series::TimeSeries;
pub use unit::TimeUnit;
