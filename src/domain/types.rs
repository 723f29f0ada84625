//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting and simulation
//! - handed back to the host as plain data records
//! - reloaded later for comparisons
//!
//! All entities are created fresh per call and are never mutated after
//! construction; none of them references the engine or a persistent store.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Average days per month, used to convert analytic rate·months cumulatives
/// into volumes (bbl or Mcf). Applied uniformly to all models.
pub const DAYS_PER_MONTH: f64 = 30.4375;

/// A single production observation.
///
/// Time is months from the start of the analysis period; rate is per-day
/// (bbl/day or Mcf/day), already unit-normalized by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductionSample {
    pub time_months: f64,
    pub rate: f64,
}

/// Concrete decline model kind.
///
/// A closed set: dispatch is exhaustive `match`, never runtime string lookup.
/// The snake_case names round-trip with the wire strings hosts send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Exponential,
    Hyperbolic,
    Harmonic,
    ModifiedHyperbolic,
    Sedm,
    Duong,
}

impl ModelKind {
    /// Every model kind, in the order `auto_fit` attempts them.
    pub const ALL: [ModelKind; 6] = [
        ModelKind::Exponential,
        ModelKind::Hyperbolic,
        ModelKind::Harmonic,
        ModelKind::ModifiedHyperbolic,
        ModelKind::Sedm,
        ModelKind::Duong,
    ];

    /// Human-readable label for reports.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Exponential => "Exponential (Arps b=0)",
            ModelKind::Hyperbolic => "Hyperbolic (Arps)",
            ModelKind::Harmonic => "Harmonic (Arps b=1)",
            ModelKind::ModifiedHyperbolic => "Modified Hyperbolic",
            ModelKind::Sedm => "Stretched Exponential (SEDM)",
            ModelKind::Duong => "Duong",
        }
    }

    /// Wire identifier (matches the serde representation).
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::Exponential => "exponential",
            ModelKind::Hyperbolic => "hyperbolic",
            ModelKind::Harmonic => "harmonic",
            ModelKind::ModifiedHyperbolic => "modified_hyperbolic",
            ModelKind::Sedm => "sedm",
            ModelKind::Duong => "duong",
        }
    }

    /// Ordered parameter names for this model.
    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            ModelKind::Exponential => &["qi", "di"],
            ModelKind::Hyperbolic => &["qi", "di", "b"],
            ModelKind::Harmonic => &["qi", "di"],
            ModelKind::ModifiedHyperbolic => &["qi", "di", "b", "d_min"],
            ModelKind::Sedm => &["qi", "tau", "n"],
            ModelKind::Duong => &["qi", "a", "m"],
        }
    }

    /// Parameter count `k` for information criteria.
    pub fn param_count(self) -> usize {
        self.param_names().len()
    }
}

impl FromStr for ModelKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| EngineError::InvalidConfig(format!("Unknown model type: {s}")))
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named parameter set for one model.
///
/// Keys are the model's ordered parameter names. The map form keeps host
/// payloads self-describing; model evaluation extracts positional values via
/// [`ModelParams::to_ordered`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelParams(BTreeMap<String, f64>);

impl ModelParams {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build from positional values in the model's declared order.
    ///
    /// # Panics
    /// Panics if `values` does not have length `kind.param_count()`. Callers
    /// size this from the same bounds table that produced the values.
    pub fn from_ordered(kind: ModelKind, values: &[f64]) -> Self {
        assert_eq!(values.len(), kind.param_count());
        let mut out = Self::new();
        for (name, &value) in kind.param_names().iter().zip(values) {
            out.set(*name, value);
        }
        out
    }

    /// Extract positional values in the model's declared order.
    pub fn to_ordered(&self, kind: ModelKind) -> Result<Vec<f64>, EngineError> {
        kind.param_names()
            .iter()
            .map(|name| {
                self.get(name).ok_or_else(|| {
                    EngineError::InvalidConfig(format!(
                        "Missing parameter '{name}' for model {kind}"
                    ))
                })
            })
            .collect()
    }
}

/// Fit quality and parameter output for a single model.
///
/// Immutable once produced. Recoverable failures (insufficient data,
/// optimization failure) are reported as `success = false` with a message so
/// the caller can still inspect them; they are never raised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub model_type: ModelKind,
    pub parameters: ModelParams,
    /// Parameter covariance estimate (row-major). Zero matrix when only the
    /// global optimizer converged and local refinement failed.
    pub covariance: Option<Vec<Vec<f64>>>,
    pub r_squared: f64,
    pub rmse: f64,
    pub aic: f64,
    pub bic: f64,
    pub residuals: Vec<f64>,
    pub success: bool,
    pub message: String,
}

impl FitResult {
    /// A failed fit carrying only the failure message.
    pub fn failure(model_type: ModelKind, message: impl Into<String>) -> Self {
        Self {
            model_type,
            parameters: ModelParams::new(),
            covariance: None,
            r_squared: 0.0,
            rmse: f64::INFINITY,
            aic: f64::INFINITY,
            bic: f64::INFINITY,
            residuals: Vec::new(),
            success: false,
            message: message.into(),
        }
    }
}

/// A forecast as three equal-length parallel series.
///
/// `time` is strictly increasing, every `rate` is at or above the economic
/// limit the forecast was generated with, and `cumulative` is volume
/// (rate·months converted via [`DAYS_PER_MONTH`]). May be empty when the very
/// first grid point already violates the limit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub time: Vec<f64>,
    pub rate: Vec<f64>,
    pub cumulative: Vec<f64>,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Forecast generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Maximum forecast horizon in months.
    pub forecast_months: f64,
    /// Minimum economic rate (bbl/day or Mcf/day); truncates the series.
    pub economic_limit: f64,
    /// Grid step in months.
    pub time_step: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            forecast_months: 360.0,
            economic_limit: 5.0,
            time_step: 1.0,
        }
    }
}

/// Monte Carlo simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Rate cutoff for the time-to-economic-limit search.
    pub economic_limit: f64,
    /// Already-produced cumulative volume added to every EUR sample.
    pub cum_to_date: f64,
    pub iterations: usize,
    /// Cap on the economic-limit search horizon, in months.
    pub max_time_months: f64,
    /// Optional per-parameter `(low, high)` clip applied to drawn samples.
    pub param_bounds: BTreeMap<String, (f64, f64)>,
    /// Base RNG seed. Each draw derives its own generator from this, so runs
    /// are reproducible and independent of execution order or parallelism.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            economic_limit: 5.0,
            cum_to_date: 0.0,
            iterations: 10_000,
            max_time_months: 600.0,
            param_bounds: BTreeMap::new(),
            seed: 42,
        }
    }
}

/// Monte Carlo EUR estimate.
///
/// Percentile labeling follows the SPE/PRMS convention, which is inverted
/// relative to naive percentile ordering:
///
/// - `eur_p90` = 10th percentile (conservative, high confidence)
/// - `eur_p50` = 50th percentile (median / best estimate)
/// - `eur_p10` = 90th percentile (optimistic, low confidence)
///
/// so `eur_p10 >= eur_p50 >= eur_p90` always holds. This is a contract with
/// downstream reserve reporting, not a bug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub eur_p10: f64,
    pub eur_p50: f64,
    pub eur_p90: f64,
    pub eur_mean: f64,
    pub eur_std: f64,
    pub eur_distribution: Vec<f64>,
    pub iterations: usize,
    /// Per-varied-parameter sample arrays, aligned with `eur_distribution`.
    pub parameter_samples: BTreeMap<String, Vec<f64>>,
}

/// Standalone goodness-of-fit metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticMetrics {
    pub r_squared: f64,
    pub adjusted_r_squared: f64,
    pub rmse: f64,
    pub nrmse: f64,
    pub mae: f64,
    pub mape: f64,
    pub aic: f64,
    pub bic: f64,
    pub durbin_watson: f64,
    pub n_points: usize,
    pub n_parameters: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_kind_wire_round_trip() {
        for kind in ModelKind::ALL {
            let parsed: ModelKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("paraboloid".parse::<ModelKind>().is_err());
    }

    #[test]
    fn model_kind_serde_uses_snake_case() {
        let json = serde_json::to_string(&ModelKind::ModifiedHyperbolic).unwrap();
        assert_eq!(json, "\"modified_hyperbolic\"");
    }

    #[test]
    fn params_ordered_round_trip() {
        let params = ModelParams::from_ordered(ModelKind::Hyperbolic, &[500.0, 0.08, 0.9]);
        let values = params.to_ordered(ModelKind::Hyperbolic).unwrap();
        assert_eq!(values, vec![500.0, 0.08, 0.9]);
    }

    #[test]
    fn params_missing_name_is_config_error() {
        let mut params = ModelParams::new();
        params.set("qi", 500.0);
        assert!(params.to_ordered(ModelKind::Exponential).is_err());
    }
}
