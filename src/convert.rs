//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result, anyhow};

use tempest_arima::{ArimaCoefficients, ArimaConfig, ArimaOrder, FittingStrategy};
use tempest_optim::{BfgsOptions, CancelToken};
use tempest_series::{TimePeriod, TimeUnit};

use crate::config::*;

/// Builds a [`TimePeriod`] from a unit name and a length.
pub fn parse_period(unit: &str, length: u32) -> Result<TimePeriod> {
    let unit: TimeUnit = unit
        .parse()
        .with_context(|| format!("invalid period unit {unit:?}"))?;
    Ok(TimePeriod::new(unit, length)?)
}

/// Sampling period of the input series.
pub fn build_sampling_period(series: &SeriesToml) -> Result<TimePeriod> {
    parse_period(&series.period_unit, series.period_length)
}

/// Parses a fitting strategy name.
pub fn parse_strategy(s: &str) -> Result<FittingStrategy> {
    s.parse().map_err(|e: String| anyhow!(e))
}

/// Builds an [`ArimaOrder`] from the TOML model configuration.
pub fn build_order(model: &ModelToml) -> Result<ArimaOrder> {
    let [p, d, q] = model.order;
    let [sp, sd, sq] = model.seasonal_order;
    let mut order = ArimaOrder::from_signed([p, d, q, sp, sd, sq])?;
    if let Some(constant) = model.constant {
        order = order.with_constant(constant);
    }
    Ok(order.with_drift(model.drift))
}

/// Builds [`BfgsOptions`] from the TOML optimiser configuration.
pub fn build_optimizer(optimizer: &OptimizerToml) -> BfgsOptions {
    BfgsOptions::new()
        .with_gradient_tolerance(optimizer.gradient_tolerance)
        .with_step_tolerance(optimizer.step_tolerance)
        .with_max_iterations(optimizer.max_iterations)
}

/// Builds an [`ArimaConfig`] from the full configuration.
///
/// Fixed coefficients, when present, switch the fit to evaluate-only mode.
pub fn build_arima_config(config: &TempestConfig, cancel: CancelToken) -> Result<ArimaConfig> {
    let order = build_order(&config.model)?;
    let cycle = parse_period(&config.series.cycle_unit, config.series.cycle_length)?;
    let strategy = parse_strategy(&config.model.strategy)?;

    let mut arima = match &config.model.coefficients {
        Some(values) => {
            ArimaConfig::from_coefficients(ArimaCoefficients::from_slice(&order, values)?)
        }
        None => ArimaConfig::from_order(order),
    };
    arima = arima
        .with_seasonal_cycle(cycle)
        .with_strategy(strategy)
        .with_optimizer(build_optimizer(&config.optimizer))
        .with_cancel_token(cancel);
    if let Some(start) = &config.model.start {
        arima = arima.with_start(start.clone());
    }
    Ok(arima)
}
