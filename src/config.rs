use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level Tempest configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TempestConfig {
    /// Sampling period and seasonal cycle.
    #[serde(default)]
    pub series: SeriesToml,

    /// Model order, strategy and optional fixed coefficients.
    #[serde(default)]
    pub model: ModelToml,

    /// BFGS settings.
    #[serde(default)]
    pub optimizer: OptimizerToml,

    /// Forecast horizon and interval level.
    #[serde(default)]
    pub forecast: ForecastToml,
}

impl TempestConfig {
    /// Reads a config file, or returns defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&toml_str).context("failed to parse TOML config")
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeriesToml {
    #[serde(default = "default_period_unit")]
    pub period_unit: String,
    #[serde(default = "default_one")]
    pub period_length: u32,
    #[serde(default = "default_cycle_unit")]
    pub cycle_unit: String,
    #[serde(default = "default_one")]
    pub cycle_length: u32,
}

impl Default for SeriesToml {
    fn default() -> Self {
        Self {
            period_unit: default_period_unit(),
            period_length: default_one(),
            cycle_unit: default_cycle_unit(),
            cycle_length: default_one(),
        }
    }
}

fn default_period_unit() -> String {
    "month".to_string()
}
fn default_cycle_unit() -> String {
    "year".to_string()
}
fn default_one() -> u32 {
    1
}

/// Model order as `[p, d, q]` and `[P, D, Q]`.
///
/// Signed so that negative entries reach the library's order validation
/// instead of failing as a TOML type error.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelToml {
    #[serde(default)]
    pub order: [i64; 3],
    #[serde(default)]
    pub seasonal_order: [i64; 3],
    /// Defaults to fitting a mean only when the series is not differenced.
    #[serde(default)]
    pub constant: Option<bool>,
    #[serde(default)]
    pub drift: bool,
    #[serde(default = "default_strategy")]
    pub strategy: String,
    /// Fixed coefficients in the standard layout; skips optimisation.
    #[serde(default)]
    pub coefficients: Option<Vec<f64>>,
    /// Optimiser starting point in the standard layout.
    #[serde(default)]
    pub start: Option<Vec<f64>>,
}

impl Default for ModelToml {
    fn default() -> Self {
        Self {
            order: [0; 3],
            seasonal_order: [0; 3],
            constant: None,
            drift: false,
            strategy: default_strategy(),
            coefficients: None,
            start: None,
        }
    }
}

fn default_strategy() -> String {
    "css-ml".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizerToml {
    #[serde(default = "default_tolerance")]
    pub gradient_tolerance: f64,
    #[serde(default = "default_tolerance")]
    pub step_tolerance: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for OptimizerToml {
    fn default() -> Self {
        Self {
            gradient_tolerance: default_tolerance(),
            step_tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_tolerance() -> f64 {
    1e-8
}
fn default_max_iterations() -> usize {
    500
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastToml {
    #[serde(default = "default_horizon")]
    pub horizon: usize,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

impl Default for ForecastToml {
    fn default() -> Self {
        Self {
            horizon: default_horizon(),
            alpha: default_alpha(),
        }
    }
}

fn default_horizon() -> usize {
    12
}
fn default_alpha() -> f64 {
    0.05
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: TempestConfig = toml::from_str("").unwrap();
        assert_eq!(config.series.period_unit, "month");
        assert_eq!(config.series.cycle_unit, "year");
        assert_eq!(config.model.order, [0, 0, 0]);
        assert_eq!(config.model.strategy, "css-ml");
        assert!(config.model.constant.is_none());
        assert_eq!(config.optimizer.max_iterations, 500);
        assert_eq!(config.forecast.horizon, 12);
        assert_eq!(config.forecast.alpha, 0.05);
    }

    #[test]
    fn full_file_parses() {
        let text = r#"
            [series]
            period_unit = "quarter"
            cycle_unit = "year"

            [model]
            order = [1, 1, 1]
            seasonal_order = [0, 1, 1]
            strategy = "ml"
            start = [0.1, -0.2, -0.3]

            [optimizer]
            max_iterations = 200

            [forecast]
            horizon = 8
            alpha = 0.2
        "#;
        let config: TempestConfig = toml::from_str(text).unwrap();
        assert_eq!(config.series.period_unit, "quarter");
        assert_eq!(config.model.seasonal_order, [0, 1, 1]);
        assert_eq!(config.model.start, Some(vec![0.1, -0.2, -0.3]));
        assert_eq!(config.optimizer.max_iterations, 200);
        assert_eq!(config.optimizer.gradient_tolerance, 1e-8);
        assert_eq!(config.forecast.horizon, 8);
    }

    #[test]
    fn unknown_fields_rejected() {
        let err = toml::from_str::<TempestConfig>("[model]\nordr = [1, 0, 0]\n").unwrap_err();
        assert!(err.to_string().contains("ordr"));
    }

    #[test]
    fn load_without_path_is_default() {
        let config = TempestConfig::load(None).unwrap();
        assert_eq!(config.model.strategy, "css-ml");
    }

    #[test]
    fn load_reports_missing_file() {
        let err = TempestConfig::load(Some(Path::new("/nonexistent/tempest.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config file"));
    }
}
