//! Observations sampled at a fixed period.

use crate::error::SeriesError;
use crate::period::TimePeriod;

/// A univariate series of finite observations taken once per `period`.
///
/// The container is read-only once built; models borrow its observations.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    period: TimePeriod,
    observations: Vec<f64>,
}

impl TimeSeries {
    /// Creates a series sampled once per `period`.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`SeriesError::EmptySeries`] | `observations` is empty |
    /// | [`SeriesError::NonFiniteObservation`] | any element is NaN or infinite |
    pub fn new(period: TimePeriod, observations: Vec<f64>) -> Result<Self, SeriesError> {
        if observations.is_empty() {
            return Err(SeriesError::EmptySeries);
        }
        if let Some(index) = observations.iter().position(|x| !x.is_finite()) {
            return Err(SeriesError::NonFiniteObservation { index });
        }
        Ok(Self {
            period,
            observations,
        })
    }

    /// Creates a series with a one-year sampling period.
    ///
    /// # Errors
    ///
    /// Same as [`TimeSeries::new`].
    pub fn from_values(observations: Vec<f64>) -> Result<Self, SeriesError> {
        Self::new(TimePeriod::one_year(), observations)
    }

    /// Returns the sampling period.
    pub fn period(&self) -> TimePeriod {
        self.period
    }

    /// Returns the observations.
    pub fn as_slice(&self) -> &[f64] {
        &self.observations
    }

    /// Returns the number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always `false`: construction rejects empty series.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Returns the number of observations per seasonal `cycle`, rounded to
    /// the nearest integer.
    pub fn seasonal_frequency(&self, cycle: &TimePeriod) -> usize {
        let freq = self.period.frequency_per(cycle).round();
        if freq < 1.0 { 0 } else { freq as usize }
    }
}
