//! Calendar and clock units.

use std::fmt;
use std::str::FromStr;

use crate::error::SeriesError;

/// Seconds in an estimated year of 365.2425 days.
const SECONDS_PER_YEAR: f64 = 31_556_952.0;

/// A unit of time with an estimated duration.
///
/// Calendar units (month and longer) use the average Gregorian year of
/// 365.2425 days, so twelve months make exactly one year and conversions
/// between clock and calendar units are approximate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// One second.
    Second,
    /// Sixty seconds.
    Minute,
    /// Sixty minutes.
    Hour,
    /// Twenty-four hours.
    Day,
    /// Seven days.
    Week,
    /// One twelfth of a year.
    Month,
    /// Three months.
    Quarter,
    /// 365.2425 days.
    Year,
    /// Ten years.
    Decade,
    /// One hundred years.
    Century,
}

impl TimeUnit {
    /// Returns the estimated duration of one unit, in seconds.
    pub fn seconds(self) -> f64 {
        match self {
            TimeUnit::Second => 1.0,
            TimeUnit::Minute => 60.0,
            TimeUnit::Hour => 3_600.0,
            TimeUnit::Day => 86_400.0,
            TimeUnit::Week => 604_800.0,
            TimeUnit::Month => SECONDS_PER_YEAR / 12.0,
            TimeUnit::Quarter => SECONDS_PER_YEAR / 4.0,
            TimeUnit::Year => SECONDS_PER_YEAR,
            TimeUnit::Decade => SECONDS_PER_YEAR * 10.0,
            TimeUnit::Century => SECONDS_PER_YEAR * 100.0,
        }
    }

    fn name(self) -> &'static str {
        match self {
            TimeUnit::Second => "second",
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
            TimeUnit::Quarter => "quarter",
            TimeUnit::Year => "year",
            TimeUnit::Decade => "decade",
            TimeUnit::Century => "century",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeUnit {
    type Err = SeriesError;

    /// Parses singular or plural unit names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let singular = lower.strip_suffix('s').unwrap_or(&lower);
        match singular {
            "second" => Ok(TimeUnit::Second),
            "minute" => Ok(TimeUnit::Minute),
            "hour" => Ok(TimeUnit::Hour),
            "day" => Ok(TimeUnit::Day),
            "week" => Ok(TimeUnit::Week),
            "month" => Ok(TimeUnit::Month),
            "quarter" => Ok(TimeUnit::Quarter),
            "year" => Ok(TimeUnit::Year),
            "decade" => Ok(TimeUnit::Decade),
            "century" | "centurie" => Ok(TimeUnit::Century),
            _ => Err(SeriesError::UnknownUnit {
                name: s.to_string(),
            }),
        }
    }
}
