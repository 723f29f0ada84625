//! Model evaluation dispatch.
//!
//! The fitter, forecaster, and simulator all rely on three primitive
//! operations per model kind:
//!
//! - `rate(t)` given ordered parameter values (for residuals/forecasts)
//! - `cumulative(t)` (for EUR/forecast volumes)
//! - `time_to_rate(q)` (for economic-limit searches)
//!
//! Dispatch is an exhaustive `match` over [`ModelKind`]; parameter values are
//! positional in the order of [`ModelKind::param_names`].

use crate::domain::ModelKind;
use crate::models::arps::{
    exponential_cumulative, exponential_eur, exponential_rate, exponential_time_to_rate,
    harmonic_cumulative, harmonic_rate, harmonic_time_to_rate, hyperbolic_cumulative,
    hyperbolic_eur, hyperbolic_rate, hyperbolic_time_to_rate,
};
use crate::models::duong::{duong_cumulative, duong_rate, duong_time_to_rate};
use crate::models::modified_hyperbolic::{
    modified_hyperbolic_cumulative, modified_hyperbolic_eur, modified_hyperbolic_rate,
    modified_hyperbolic_time_to_rate,
};
use crate::models::sedm::{sedm_cumulative, sedm_eur, sedm_rate, sedm_time_to_rate};

/// Production rate at time `t` (months).
///
/// # Panics
/// Panics if `p` does not have length `kind.param_count()`. Callers extract
/// `p` via `ModelParams::to_ordered`, which guarantees the length.
pub fn rate(kind: ModelKind, t: f64, p: &[f64]) -> f64 {
    match kind {
        ModelKind::Exponential => exponential_rate(t, p[0], p[1]),
        ModelKind::Hyperbolic => hyperbolic_rate(t, p[0], p[1], p[2]),
        ModelKind::Harmonic => harmonic_rate(t, p[0], p[1]),
        ModelKind::ModifiedHyperbolic => modified_hyperbolic_rate(t, p[0], p[1], p[2], p[3]),
        ModelKind::Sedm => sedm_rate(t, p[0], p[1], p[2]),
        ModelKind::Duong => duong_rate(t, p[0], p[1], p[2]),
    }
}

/// Cumulative production at time `t`, in rate·months.
///
/// All cumulatives are analytic except Duong (rate·time identity) and SEDM
/// (regularized lower incomplete gamma).
///
/// # Panics
/// Panics if `p` does not have length `kind.param_count()`.
pub fn cumulative(kind: ModelKind, t: f64, p: &[f64]) -> f64 {
    match kind {
        ModelKind::Exponential => exponential_cumulative(t, p[0], p[1]),
        ModelKind::Hyperbolic => hyperbolic_cumulative(t, p[0], p[1], p[2]),
        ModelKind::Harmonic => harmonic_cumulative(t, p[0], p[1]),
        ModelKind::ModifiedHyperbolic => modified_hyperbolic_cumulative(t, p[0], p[1], p[2], p[3]),
        ModelKind::Sedm => sedm_cumulative(t, p[0], p[1], p[2]),
        ModelKind::Duong => duong_cumulative(t, p[0], p[1], p[2]),
    }
}

/// Time (months) until the rate declines to `q`. Returns 0 when `q` is not
/// reachable from above (`q <= 0`, `qi <= 0`, or `q >= qi`).
///
/// # Panics
/// Panics if `p` does not have length `kind.param_count()`.
pub fn time_to_rate(kind: ModelKind, q: f64, p: &[f64]) -> f64 {
    match kind {
        ModelKind::Exponential => exponential_time_to_rate(q, p[0], p[1]),
        ModelKind::Hyperbolic => hyperbolic_time_to_rate(q, p[0], p[1], p[2]),
        ModelKind::Harmonic => harmonic_time_to_rate(q, p[0], p[1]),
        ModelKind::ModifiedHyperbolic => {
            modified_hyperbolic_time_to_rate(q, p[0], p[1], p[2], p[3])
        }
        ModelKind::Sedm => sedm_time_to_rate(q, p[0], p[1], p[2]),
        ModelKind::Duong => duong_time_to_rate(q, p[0], p[1], p[2]),
    }
}

/// Closed-form EUR as `t → ∞`, where one exists without an economic cutoff.
///
/// `None` for harmonic, hyperbolic with `b >= 1`, and Duong, all of which
/// diverge and only have a cutoff-bounded EUR.
///
/// # Panics
/// Panics if `p` does not have length `kind.param_count()`.
pub fn eur(kind: ModelKind, p: &[f64]) -> Option<f64> {
    match kind {
        ModelKind::Exponential => exponential_eur(p[0], p[1]),
        ModelKind::Hyperbolic => hyperbolic_eur(p[0], p[1], p[2]),
        ModelKind::Harmonic => None,
        ModelKind::ModifiedHyperbolic => modified_hyperbolic_eur(p[0], p[1], p[2], p[3]),
        ModelKind::Sedm => sedm_eur(p[0], p[1], p[2]),
        ModelKind::Duong => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_params(kind: ModelKind) -> Vec<f64> {
        match kind {
            ModelKind::Exponential | ModelKind::Harmonic => vec![1000.0, 0.08],
            ModelKind::Hyperbolic => vec![1000.0, 0.08, 0.9],
            ModelKind::ModifiedHyperbolic => vec![1000.0, 0.08, 1.1, 0.006],
            ModelKind::Sedm => vec![1000.0, 18.0, 0.6],
            ModelKind::Duong => vec![1000.0, 1.5, 1.2],
        }
    }

    #[test]
    fn every_model_rate_non_negative_and_non_increasing() {
        for kind in ModelKind::ALL {
            let p = valid_params(kind);
            // Duong requires t >= 1; start all models there for uniformity.
            let mut prev = f64::INFINITY;
            for i in 1..=360 {
                let r = rate(kind, i as f64, &p);
                assert!(r.is_finite() && r >= 0.0, "{kind} rate at t={i}");
                assert!(r <= prev + 1e-12, "{kind} rate increased at t={i}");
                prev = r;
            }
        }
    }

    #[test]
    fn every_model_cumulative_non_decreasing() {
        for kind in ModelKind::ALL {
            let p = valid_params(kind);
            let mut prev = 0.0;
            for i in 1..=360 {
                let c = cumulative(kind, i as f64, &p);
                assert!(c.is_finite() && c >= prev - 1e-9, "{kind} cumulative at t={i}");
                prev = c;
            }
        }
    }

    #[test]
    fn eur_matches_divergence_table() {
        assert!(eur(ModelKind::Exponential, &[1000.0, 0.08]).is_some());
        assert!(eur(ModelKind::Hyperbolic, &[1000.0, 0.08, 0.5]).is_some());
        assert!(eur(ModelKind::Hyperbolic, &[1000.0, 0.08, 1.5]).is_none());
        assert!(eur(ModelKind::Harmonic, &[1000.0, 0.08]).is_none());
        assert!(eur(ModelKind::ModifiedHyperbolic, &[1000.0, 0.08, 1.5, 0.006]).is_some());
        assert!(eur(ModelKind::Sedm, &[1000.0, 18.0, 0.6]).is_some());
        assert!(eur(ModelKind::Duong, &[1000.0, 1.5, 1.2]).is_none());
    }

    #[test]
    fn time_to_rate_consistent_with_rate() {
        for kind in ModelKind::ALL {
            let p = valid_params(kind);
            let target = rate(kind, 40.0, &p);
            let t = time_to_rate(kind, target, &p);
            let q_back = rate(kind, t, &p);
            assert!(
                (q_back - target).abs() / target < 1e-2,
                "{kind}: q({t}) = {q_back}, want {target}"
            );
        }
    }
}
