//! Parameter distribution specs and seeded sampling.
//!
//! The serde representation is tagged by `type` with the wire names hosts
//! send (`normal`, `lognormal`, `uniform`, `triangular`); an unrecognized
//! type fails at deserialization, so the in-process set is closed.
//!
//! Specs are compiled into [`Sampler`]s once, before any simulation work:
//! distribution configuration errors are a fail-fast tier, never deferred
//! per-iteration.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{LogNormal, Normal, Triangular};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Floor applied to standard deviations to avoid degenerate draws.
const STD_FLOOR: f64 = 1e-12;

/// A parameter uncertainty distribution, as configured by the host.
///
/// `lognormal` takes the *arithmetic* mean and standard deviation; the
/// conversion to log-space parameters happens internally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DistributionSpec {
    Normal { mean: f64, std: f64 },
    Lognormal { mean: f64, std: f64 },
    Uniform { min: f64, max: f64 },
    Triangular { min: f64, mode: f64, max: f64 },
}

/// A validated, ready-to-draw sampler.
#[derive(Debug, Clone)]
pub enum Sampler {
    Normal(Normal<f64>),
    LogNormal(LogNormal<f64>),
    Uniform { low: f64, high: f64 },
    Triangular(Triangular<f64>),
    /// Collapsed range: every draw returns the same value.
    Degenerate(f64),
}

impl DistributionSpec {
    /// Validate the spec and build its sampler.
    ///
    /// Inverted `min`/`max` bounds are swapped and a triangular mode is
    /// clamped into range rather than rejected; non-finite fields are
    /// configuration errors.
    pub fn build(&self, param: &str) -> EngineResult<Sampler> {
        let invalid = |detail: String| {
            EngineError::InvalidDistribution(format!("parameter '{param}': {detail}"))
        };

        match *self {
            DistributionSpec::Normal { mean, std } => {
                if !mean.is_finite() || !std.is_finite() {
                    return Err(invalid(format!("non-finite normal(mean={mean}, std={std})")));
                }
                let normal = Normal::new(mean, std.max(STD_FLOOR))
                    .map_err(|e| invalid(format!("normal: {e}")))?;
                Ok(Sampler::Normal(normal))
            }
            DistributionSpec::Lognormal { mean, std } => {
                if !mean.is_finite() || !std.is_finite() {
                    return Err(invalid(format!(
                        "non-finite lognormal(mean={mean}, std={std})"
                    )));
                }
                // Convert arithmetic moments to log-space parameters.
                let mean = mean.max(STD_FLOOR);
                let std = std.max(STD_FLOOR);
                let sigma_ln = (1.0 + (std / mean).powi(2)).ln().sqrt();
                let mu_ln = mean.ln() - 0.5 * sigma_ln * sigma_ln;
                let lognormal = LogNormal::new(mu_ln, sigma_ln)
                    .map_err(|e| invalid(format!("lognormal: {e}")))?;
                Ok(Sampler::LogNormal(lognormal))
            }
            DistributionSpec::Uniform { min, max } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(invalid(format!("non-finite uniform(min={min}, max={max})")));
                }
                let (low, high) = if max < min { (max, min) } else { (min, max) };
                if high == low {
                    return Ok(Sampler::Degenerate(low));
                }
                Ok(Sampler::Uniform { low, high })
            }
            DistributionSpec::Triangular { min, mode, max } => {
                if !min.is_finite() || !mode.is_finite() || !max.is_finite() {
                    return Err(invalid(format!(
                        "non-finite triangular(min={min}, mode={mode}, max={max})"
                    )));
                }
                let (low, high) = if max < min { (max, min) } else { (min, max) };
                if high == low {
                    return Ok(Sampler::Degenerate(low));
                }
                let mode = mode.clamp(low, high);
                let triangular = Triangular::new(low, high, mode)
                    .map_err(|e| invalid(format!("triangular: {e}")))?;
                Ok(Sampler::Triangular(triangular))
            }
        }
    }
}

impl Sampler {
    pub fn sample(&self, rng: &mut StdRng) -> f64 {
        match self {
            Sampler::Normal(d) => d.sample(rng),
            Sampler::LogNormal(d) => d.sample(rng),
            Sampler::Uniform { low, high } => rng.gen_range(*low..=*high),
            Sampler::Triangular(d) => d.sample(rng),
            Sampler::Degenerate(value) => *value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn wire_round_trip_uses_type_tags() {
        let spec: DistributionSpec =
            serde_json::from_str(r#"{"type":"lognormal","mean":500.0,"std":100.0}"#).unwrap();
        assert_eq!(
            spec,
            DistributionSpec::Lognormal {
                mean: 500.0,
                std: 100.0
            }
        );
        assert!(serde_json::from_str::<DistributionSpec>(r#"{"type":"cauchy","x":1.0}"#).is_err());
    }

    #[test]
    fn lognormal_moment_conversion_preserves_the_mean() {
        let sampler = DistributionSpec::Lognormal {
            mean: 500.0,
            std: 100.0,
        }
        .build("qi")
        .unwrap();

        let mut rng = rng();
        let n = 200_000;
        let sum: f64 = (0..n).map(|_| sampler.sample(&mut rng)).sum();
        let mean = sum / n as f64;
        assert!((mean - 500.0).abs() / 500.0 < 0.02, "mean = {mean}");
    }

    #[test]
    fn inverted_uniform_bounds_are_swapped() {
        let sampler = DistributionSpec::Uniform { min: 5.0, max: 1.0 }.build("di").unwrap();
        let mut rng = rng();
        for _ in 0..100 {
            let v = sampler.sample(&mut rng);
            assert!((1.0..=5.0).contains(&v));
        }
    }

    #[test]
    fn triangular_mode_is_clamped_into_range() {
        let sampler = DistributionSpec::Triangular {
            min: 0.3,
            mode: 9.0,
            max: 1.5,
        }
        .build("b")
        .unwrap();
        let mut rng = rng();
        for _ in 0..100 {
            let v = sampler.sample(&mut rng);
            assert!((0.3..=1.5).contains(&v));
        }
    }

    #[test]
    fn zero_std_normal_is_a_point_mass_in_practice() {
        let sampler = DistributionSpec::Normal { mean: 0.08, std: 0.0 }.build("di").unwrap();
        let mut rng = rng();
        let v = sampler.sample(&mut rng);
        assert!((v - 0.08).abs() < 1e-9);
    }

    #[test]
    fn non_finite_fields_fail_fast() {
        let err = DistributionSpec::Normal {
            mean: f64::NAN,
            std: 1.0,
        }
        .build("qi");
        assert!(matches!(err, Err(EngineError::InvalidDistribution(_))));
    }
}
