//! Sampling periods: a time unit multiplied by a positive length.

use std::fmt;

use crate::error::SeriesError;
use crate::unit::TimeUnit;

/// An amount of time expressed as `length` consecutive `unit`s.
///
/// Used both for the sampling period of a series (the time between two
/// observations) and for the seasonal cycle of a model (the time it takes a
/// seasonal pattern to repeat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimePeriod {
    unit: TimeUnit,
    length: u32,
}

impl TimePeriod {
    /// Creates a new period of `length` units.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::InvalidPeriodLength`] if `length` is zero.
    pub fn new(unit: TimeUnit, length: u32) -> Result<Self, SeriesError> {
        if length == 0 {
            return Err(SeriesError::InvalidPeriodLength { length });
        }
        Ok(Self { unit, length })
    }

    /// One hour.
    pub fn one_hour() -> Self {
        Self::single(TimeUnit::Hour)
    }

    /// One day.
    pub fn one_day() -> Self {
        Self::single(TimeUnit::Day)
    }

    /// One week.
    pub fn one_week() -> Self {
        Self::single(TimeUnit::Week)
    }

    /// One month.
    pub fn one_month() -> Self {
        Self::single(TimeUnit::Month)
    }

    /// One quarter.
    pub fn one_quarter() -> Self {
        Self::single(TimeUnit::Quarter)
    }

    /// One year.
    pub fn one_year() -> Self {
        Self::single(TimeUnit::Year)
    }

    fn single(unit: TimeUnit) -> Self {
        Self { unit, length: 1 }
    }

    /// Returns the unit of this period.
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Returns the number of units in this period.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Returns the estimated duration of this period, in seconds.
    pub fn total_seconds(&self) -> f64 {
        self.unit.seconds() * f64::from(self.length)
    }

    /// Returns how many of this period fit into `cycle`.
    ///
    /// For example, a one-month period has a frequency of 12 per one-year
    /// cycle. The result is fractional when the cycle is not a whole
    /// multiple of this period.
    pub fn frequency_per(&self, cycle: &TimePeriod) -> f64 {
        cycle.total_seconds() / self.total_seconds()
    }
}

impl Default for TimePeriod {
    /// One year.
    fn default() -> Self {
        Self::one_year()
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.length == 1 {
            write!(f, "1 {}", self.unit)
        } else {
            write!(f, "{} {}s", self.length, self.unit)
        }
    }
}
