//! Plain-text series input.

use std::path::Path;

use anyhow::{Context, Result};
use tempest_series::{TimePeriod, TimeSeries};

/// Parses one observation per line. Blank lines and everything after a `#`
/// are ignored.
pub fn parse_values(text: &str) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let content = line.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let value: f64 = content
            .parse()
            .with_context(|| format!("line {}: cannot parse {content:?} as a number", i + 1))?;
        values.push(value);
    }
    Ok(values)
}

/// Reads a series file sampled every `period`.
pub fn read_series(path: &Path, period: TimePeriod) -> Result<TimeSeries> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read series file: {}", path.display()))?;
    let values = parse_values(&text)?;
    TimeSeries::new(period, values)
        .with_context(|| format!("invalid series in {}", path.display()))
}
