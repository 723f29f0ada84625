//! Probabilistic EUR estimation via Monte Carlo simulation.
//!
//! Each draw perturbs the base parameter set per the configured
//! distributions, finds the time to the economic limit by bounded binary
//! search on the rate function, and accumulates a cutoff-bounded EUR sample.
//! Draws are independent: each derives its own RNG from the base seed, so a
//! run is reproducible and its result does not depend on execution order or
//! parallelism.
//!
//! Percentile labeling follows the SPE/PRMS convention (P90 = 10th
//! percentile, P10 = 90th); see [`MonteCarloResult`].

use std::collections::BTreeMap;

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::{
    ModelKind, ModelParams, MonteCarloResult, SimulationConfig, DAYS_PER_MONTH,
};
use crate::error::{EngineError, EngineResult};
use crate::models;
use crate::monte_carlo::sampling::{DistributionSpec, Sampler};

/// Binary search settings for the economic-limit crossing.
const SEARCH_ITERS: usize = 60;
const SEARCH_TOL_MONTHS: f64 = 0.01;
const SEARCH_T_START: f64 = 0.01;

/// Probabilistic EUR estimator.
#[derive(Debug, Clone, Default)]
pub struct MonteCarloSimulator;

/// One varied parameter, compiled for the draw loop.
struct VariedParam {
    /// Index into the model's ordered parameter values.
    slot: usize,
    name: String,
    sampler: Sampler,
    clip: Option<(f64, f64)>,
}

impl MonteCarloSimulator {
    pub fn new() -> Self {
        Self
    }

    /// Run the simulation.
    ///
    /// `base_parameters` supplies defaults for parameters that are not
    /// varied; `param_distributions` maps parameter names to their
    /// uncertainty distributions. All configuration is validated before the
    /// first draw; numeric failures inside a draw degrade that sample to
    /// `cum_to_date` instead of aborting the run.
    pub fn run(
        &self,
        kind: ModelKind,
        base_parameters: &ModelParams,
        param_distributions: &BTreeMap<String, DistributionSpec>,
        config: &SimulationConfig,
    ) -> EngineResult<MonteCarloResult> {
        if config.iterations == 0 {
            return Err(EngineError::InvalidConfig(
                "Monte Carlo iterations must be > 0".to_string(),
            ));
        }
        if !(config.max_time_months.is_finite() && config.max_time_months > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "max_time_months must be positive, got {}",
                config.max_time_months
            )));
        }
        if !config.economic_limit.is_finite() || config.economic_limit < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "Economic limit must be finite and non-negative, got {}",
                config.economic_limit
            )));
        }

        let names = kind.param_names();
        for name in param_distributions.keys() {
            if !names.contains(&name.as_str()) {
                return Err(EngineError::InvalidDistribution(format!(
                    "'{name}' is not a parameter of model {kind}"
                )));
            }
        }

        // Base values per slot; a slot may be absent only when a distribution
        // covers it on every draw.
        let base_values: Vec<f64> = names
            .iter()
            .map(|&name| {
                if let Some(value) = base_parameters.get(name) {
                    Ok(value)
                } else if param_distributions.contains_key(name) {
                    Ok(f64::NAN) // overwritten by the sampler on every draw
                } else {
                    Err(EngineError::InvalidConfig(format!(
                        "Missing parameter '{name}' for model {kind}"
                    )))
                }
            })
            .collect::<EngineResult<_>>()?;

        // Compile samplers up front: distribution config errors fail here,
        // before any sampling begins.
        let varied: Vec<VariedParam> = param_distributions
            .iter()
            .map(|(name, spec)| {
                let sampler = spec.build(name)?;
                Ok(VariedParam {
                    slot: names.iter().position(|&n| n == name.as_str()).unwrap_or_default(),
                    name: name.clone(),
                    sampler,
                    clip: config.param_bounds.get(name).copied(),
                })
            })
            .collect::<EngineResult<_>>()?;

        debug!(model = %kind, iterations = config.iterations, varied = varied.len(), "running Monte Carlo EUR simulation");

        let draws: Vec<(f64, Vec<f64>)> = (0..config.iterations)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(i as u64));
                let mut values = base_values.clone();
                let mut sampled = Vec::with_capacity(varied.len());
                for param in &varied {
                    let mut draw = param.sampler.sample(&mut rng);
                    if let Some((low, high)) = param.clip {
                        draw = draw.clamp(low.min(high), low.max(high));
                    }
                    values[param.slot] = draw;
                    sampled.push(draw);
                }
                (self.eur_sample(kind, &values, config), sampled)
            })
            .collect();

        let degraded = draws
            .iter()
            .filter(|(eur, _)| *eur == config.cum_to_date)
            .count();
        if degraded > 0 {
            warn!(model = %kind, degraded, "samples degraded to cum_to_date");
        }

        let eur_samples: Vec<f64> = draws.iter().map(|(eur, _)| *eur).collect();
        let mut parameter_samples: BTreeMap<String, Vec<f64>> = varied
            .iter()
            .map(|p| (p.name.clone(), Vec::with_capacity(config.iterations)))
            .collect();
        for (_, sampled) in &draws {
            for (param, &value) in varied.iter().zip(sampled.iter()) {
                if let Some(series) = parameter_samples.get_mut(&param.name) {
                    series.push(value);
                }
            }
        }

        let n = eur_samples.len() as f64;
        let eur_mean = eur_samples.iter().sum::<f64>() / n;
        let eur_std = (eur_samples
            .iter()
            .map(|v| (v - eur_mean) * (v - eur_mean))
            .sum::<f64>()
            / n)
            .sqrt();

        let mut sorted = eur_samples.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        // SPE/PRMS convention: the numeric label is inverted relative to the
        // percentile index. P90 is the conservative (10th percentile) value.
        Ok(MonteCarloResult {
            eur_p10: percentile(&sorted, 90.0),
            eur_p50: percentile(&sorted, 50.0),
            eur_p90: percentile(&sorted, 10.0),
            eur_mean,
            eur_std,
            eur_distribution: eur_samples,
            iterations: config.iterations,
            parameter_samples,
        })
    }

    /// One cutoff-bounded EUR sample. Numeric failure degrades to
    /// `cum_to_date` rather than aborting the run.
    fn eur_sample(&self, kind: ModelKind, values: &[f64], config: &SimulationConfig) -> f64 {
        let t_econ = time_to_economic_limit(
            kind,
            values,
            config.economic_limit,
            config.max_time_months,
        );
        if t_econ <= 0.0 {
            return config.cum_to_date;
        }
        let cum = models::cumulative(kind, t_econ, values) * DAYS_PER_MONTH;
        if !cum.is_finite() {
            return config.cum_to_date;
        }
        cum + config.cum_to_date
    }
}

/// Binary search for the time when the rate drops below the economic limit,
/// assuming the rate is monotonically non-increasing in time.
fn time_to_economic_limit(kind: ModelKind, values: &[f64], limit: f64, max_months: f64) -> f64 {
    // Quick check: already below the limit at the start?
    let q_start = models::rate(kind, SEARCH_T_START, values);
    if !q_start.is_finite() || q_start < limit {
        return 0.0;
    }

    // Still above the limit at the horizon?
    let q_end = models::rate(kind, max_months, values);
    if !q_end.is_finite() || q_end >= limit {
        return max_months;
    }

    let (mut t_low, mut t_high) = (SEARCH_T_START, max_months);
    for _ in 0..SEARCH_ITERS {
        let t_mid = (t_low + t_high) / 2.0;
        let q_mid = models::rate(kind, t_mid, values);
        if !q_mid.is_finite() {
            t_high = t_mid;
            continue;
        }
        if q_mid > limit {
            t_low = t_mid;
        } else {
            t_high = t_mid;
        }
        if (t_high - t_low).abs() < SEARCH_TOL_MONTHS {
            break;
        }
    }
    (t_low + t_high) / 2.0
}

/// Percentile with linear interpolation between order statistics, over an
/// already-sorted slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
