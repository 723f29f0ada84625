//! Per-model parameter bounds and initial guesses.
//!
//! Bounds are a fixed table per model, with one data-driven adjustment: the
//! `qi` upper bound becomes `max(3 × max(q), table_upper)` so the box adapts
//! to the data scale. Initial guesses are physics-informed (first observed
//! rate, log-slope decline estimate) with model-specific extras, overridable
//! by caller-supplied parameters, and always clamped into the box.

use crate::domain::{ModelKind, ModelParams};

/// Lower/upper bound box in the model's parameter order.
#[derive(Debug, Clone)]
pub struct ParamBounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl ParamBounds {
    pub fn clamp(&self, values: &mut [f64]) {
        for (v, (lo, hi)) in values
            .iter_mut()
            .zip(self.lower.iter().zip(self.upper.iter()))
        {
            *v = v.clamp(*lo, *hi);
        }
    }
}

/// Bound table for a model, adapted to the observed maximum rate.
pub fn bounds_for(kind: ModelKind, q_max: f64) -> ParamBounds {
    let (lower, mut upper): (Vec<f64>, Vec<f64>) = match kind {
        ModelKind::Exponential | ModelKind::Harmonic => {
            (vec![1.0, 1e-6], vec![1e6, 5.0])
        }
        ModelKind::Hyperbolic => (vec![1.0, 1e-6, 0.01], vec![1e6, 5.0, 2.5]),
        ModelKind::ModifiedHyperbolic => {
            (vec![1.0, 1e-6, 0.01, 1e-4], vec![1e6, 5.0, 2.5, 0.5])
        }
        ModelKind::Sedm => (vec![1.0, 0.1, 0.01], vec![1e6, 1e5, 2.0]),
        ModelKind::Duong => (vec![0.1, 0.1, 0.5], vec![1e6, 10.0, 3.0]),
    };
    upper[0] = (3.0 * q_max).max(upper[0]);
    ParamBounds { lower, upper }
}

/// Physics-informed initial guess in the model's parameter order.
///
/// `qi₀` is the first observed rate; `di₀` comes from the log-slope between
/// the first and last points, floored at 1e-6, defaulting to 5%/month when
/// not computable. Caller-supplied values override individual guesses.
pub fn initial_guess(
    kind: ModelKind,
    t: &[f64],
    q: &[f64],
    user_params: Option<&ModelParams>,
) -> Vec<f64> {
    let qi = q.first().copied().unwrap_or(1.0);
    let di = estimate_decline(t, q).unwrap_or(0.05);
    let t_last = t.last().copied().unwrap_or(1.0);

    let mut guess: Vec<f64> = match kind {
        ModelKind::Exponential | ModelKind::Harmonic => vec![qi, di],
        ModelKind::Hyperbolic => vec![qi, di, 0.8],
        ModelKind::ModifiedHyperbolic => vec![qi, di, 1.0, 0.005],
        ModelKind::Sedm => vec![qi, (t_last / 2.0).max(1.0), 0.5],
        ModelKind::Duong => vec![qi, 1.5, 1.2],
    };

    if let Some(user) = user_params {
        for (slot, name) in guess.iter_mut().zip(kind.param_names()) {
            if let Some(value) = user.get(name) {
                *slot = value;
            }
        }
    }
    guess
}

/// Nominal decline estimate from the endpoints: `−ln(q_n/q_0) / (t_n − t_0)`,
/// floored at 1e-6. `None` when the span or rates make it meaningless.
fn estimate_decline(t: &[f64], q: &[f64]) -> Option<f64> {
    let (q_first, q_last) = (*q.first()?, *q.last()?);
    let (t_first, t_last) = (*t.first()?, *t.last()?);
    if q.len() < 2 || q_first <= 0.0 || q_last <= 0.0 || t_last <= t_first {
        return None;
    }
    Some((-(q_last / q_first).ln() / (t_last - t_first)).max(1e-6))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qi_upper_bound_adapts_to_data_scale() {
        let small = bounds_for(ModelKind::Exponential, 100.0);
        assert_eq!(small.upper[0], 1e6);
        let big = bounds_for(ModelKind::Exponential, 1e6);
        assert_eq!(big.upper[0], 3e6);
    }

    #[test]
    fn decline_guess_matches_exact_exponential() {
        let t: Vec<f64> = (0..24).map(|i| i as f64).collect();
        let q: Vec<f64> = t.iter().map(|&ti| 1000.0 * (-0.08 * ti).exp()).collect();
        let guess = initial_guess(ModelKind::Exponential, &t, &q, None);
        assert!((guess[0] - 1000.0).abs() < 1e-9);
        assert!((guess[1] - 0.08).abs() < 1e-9);
    }

    #[test]
    fn inclining_data_floors_the_decline_guess() {
        let t = [0.0, 1.0, 2.0];
        let q = [100.0, 150.0, 200.0];
        let guess = initial_guess(ModelKind::Exponential, &t, &q, None);
        assert_eq!(guess[1], 1e-6);
    }

    #[test]
    fn user_params_override_guesses() {
        let t = [0.0, 1.0, 2.0];
        let q = [100.0, 90.0, 81.0];
        let mut user = ModelParams::new();
        user.set("b", 1.3);
        let guess = initial_guess(ModelKind::Hyperbolic, &t, &q, Some(&user));
        assert_eq!(guess[2], 1.3);
        assert!((guess[0] - 100.0).abs() < 1e-12);
    }

    #[test]
    fn clamp_pulls_guess_into_box() {
        let bounds = bounds_for(ModelKind::Duong, 50.0);
        let mut guess = vec![0.01, 20.0, 0.1];
        bounds.clamp(&mut guess);
        assert_eq!(guess, vec![0.1, 10.0, 0.5]);
    }
}
