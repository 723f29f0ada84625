//! Forecast generation.
//!
//! Projects a fitted (or caller-supplied) parameter set forward on a fixed
//! monthly grid, truncating at the economic rate cutoff. The analytic
//! cumulatives are in rate·months; the series converts them to volume via
//! [`DAYS_PER_MONTH`], applied uniformly to all models.

use crate::domain::{ForecastConfig, ForecastSeries, ModelKind, ModelParams, DAYS_PER_MONTH};
use crate::error::{EngineError, EngineResult};
use crate::models;

/// Generate a rate/cumulative forecast under an economic cutoff.
///
/// The time grid is `step, 2·step, …` up to the last multiple at or below
/// `forecast_months` (Duong evaluation clamps each point to >= 1 month). The
/// series is truncated strictly before the first rate below the limit, and
/// comes back all-empty when the first grid point already violates it. A zero
/// economic limit with an infinite-EUR model still terminates at the horizon
/// because the grid is finite. A non-finite model evaluation is a `Numeric`
/// error since there is no partial result to degrade into.
pub fn generate_forecast(
    kind: ModelKind,
    parameters: &ModelParams,
    config: &ForecastConfig,
) -> EngineResult<ForecastSeries> {
    if !(config.time_step.is_finite() && config.time_step > 0.0) {
        return Err(EngineError::InvalidConfig(format!(
            "Forecast time step must be positive, got {}",
            config.time_step
        )));
    }
    if !(config.forecast_months.is_finite() && config.forecast_months >= config.time_step) {
        return Err(EngineError::InvalidConfig(format!(
            "Forecast horizon must cover at least one step, got {} months",
            config.forecast_months
        )));
    }
    if !config.economic_limit.is_finite() || config.economic_limit < 0.0 {
        return Err(EngineError::InvalidConfig(format!(
            "Economic limit must be finite and non-negative, got {}",
            config.economic_limit
        )));
    }

    let values = parameters.to_ordered(kind)?;

    let n_steps = (config.forecast_months / config.time_step).floor() as usize;
    let mut time = Vec::with_capacity(n_steps);
    let mut rate = Vec::with_capacity(n_steps);
    let mut cumulative = Vec::with_capacity(n_steps);

    for i in 1..=n_steps {
        let mut t = i as f64 * config.time_step;
        if kind == ModelKind::Duong {
            t = t.max(1.0);
        }
        let q = models::rate(kind, t, &values);
        if !q.is_finite() {
            return Err(EngineError::Numeric(format!(
                "Model {kind} produced a non-finite rate at t = {t} months"
            )));
        }
        if q < config.economic_limit {
            break;
        }
        time.push(t);
        rate.push(q);
        cumulative.push(models::cumulative(kind, t, &values) * DAYS_PER_MONTH);
    }

    Ok(ForecastSeries {
        time,
        rate,
        cumulative,
    })
}
