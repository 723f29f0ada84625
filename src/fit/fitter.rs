//! Decline curve fitting with a local → global fallback chain.
//!
//! Strategy, per model:
//!
//! 1. clean the samples (drop non-finite, non-positive rates, negative times)
//! 2. bounded local Levenberg–Marquardt from a physics-informed guess
//! 3. on divergence, differential evolution over the bound box, then one more
//!    local refinement seeded at the global result to recover a covariance
//! 4. attach quality metrics (R², RMSE, AIC, BIC)
//!
//! Recoverable failures come back as `FitResult { success: false }`; this
//! path never panics and never returns `Err`.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::{FitResult, ModelKind, ModelParams, ProductionSample};
use crate::fit::bounds::{bounds_for, initial_guess};
use crate::math::{differential_evolution, levenberg_marquardt, DeOptions, LmFit, LmOptions};
use crate::models;

/// Penalty returned to the global optimizer when the model goes non-finite.
const OBJECTIVE_PENALTY: f64 = 1e20;

/// Fitting options shared across models.
#[derive(Debug, Clone, Default)]
pub struct FitOptions {
    pub lm: LmOptions,
    pub de: DeOptions,
}

/// Orchestrates decline curve fitting across all model types.
#[derive(Debug, Clone, Default)]
pub struct CurveFitter {
    options: FitOptions,
}

impl CurveFitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FitOptions) -> Self {
        Self { options }
    }

    /// Fit one decline model to production data.
    ///
    /// `t` is months from the start of the analysis period, `q` the matching
    /// per-day rates. `initial_params` overrides individual auto-generated
    /// guesses where supplied.
    pub fn fit(
        &self,
        t: &[f64],
        q: &[f64],
        kind: ModelKind,
        initial_params: Option<&ModelParams>,
    ) -> FitResult {
        if t.len() != q.len() {
            return FitResult::failure(
                kind,
                format!("Time/rate length mismatch: {} vs {}", t.len(), q.len()),
            );
        }

        // Clean: remove zeros, negatives, NaN, inf.
        let (mut t_clean, q_clean): (Vec<f64>, Vec<f64>) = t
            .iter()
            .zip(q.iter())
            .filter(|&(&ti, &qi)| ti.is_finite() && qi.is_finite() && qi > 0.0 && ti >= 0.0)
            .unzip();

        if t_clean.len() < 3 {
            return FitResult::failure(kind, "Insufficient valid data points (need >= 3)");
        }

        // Duong needs strictly positive time; shift the whole array if the
        // record starts at zero.
        if kind == ModelKind::Duong && t_clean[0] == 0.0 {
            for ti in &mut t_clean {
                *ti += 1.0;
            }
        }

        let q_max = q_clean.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let bounds = bounds_for(kind, q_max);
        let mut p0 = initial_guess(kind, &t_clean, &q_clean, initial_params);
        bounds.clamp(&mut p0);

        let model = |ti: f64, p: &[f64]| models::rate(kind, ti, p);
        debug!(model = %kind, n = t_clean.len(), "fitting decline model");

        let local = levenberg_marquardt(
            &model,
            &t_clean,
            &q_clean,
            &p0,
            &bounds.lower,
            &bounds.upper,
            &self.options.lm,
        );

        let solved = match local {
            Some(fit) => fit,
            None => {
                warn!(model = %kind, "local solve diverged, falling back to differential evolution");
                match self.global_fit(kind, &t_clean, &q_clean, &bounds.lower, &bounds.upper) {
                    Some(fit) => fit,
                    None => {
                        return FitResult::failure(
                            kind,
                            "Optimization failed: local and global solvers did not converge",
                        );
                    }
                }
            }
        };

        self.build_result(kind, &t_clean, &q_clean, solved)
    }

    /// [`CurveFitter::fit`] over a production record instead of parallel
    /// arrays.
    pub fn fit_samples(
        &self,
        samples: &[ProductionSample],
        kind: ModelKind,
        initial_params: Option<&ModelParams>,
    ) -> FitResult {
        let (t, q): (Vec<f64>, Vec<f64>) =
            samples.iter().map(|s| (s.time_months, s.rate)).unzip();
        self.fit(&t, &q, kind, initial_params)
    }

    /// Fit all model types and return the successes ranked by AIC (best
    /// first). Models that individually fail are excluded, never raised; the
    /// ordering is deterministic regardless of parallel execution.
    pub fn auto_fit(&self, t: &[f64], q: &[f64]) -> Vec<FitResult> {
        let mut results: Vec<FitResult> = ModelKind::ALL
            .par_iter()
            .map(|&kind| self.fit(t, q, kind, None))
            .filter(|result| result.success)
            .collect();
        // Stable sort: AIC ties keep model declaration order.
        results.sort_by(|a, b| a.aic.partial_cmp(&b.aic).unwrap_or(std::cmp::Ordering::Equal));
        results
    }

    /// Differential evolution over the bound box, then a local refinement
    /// seeded at the global result to recover a covariance estimate. The
    /// covariance stays a zero matrix when refinement also fails.
    fn global_fit(
        &self,
        kind: ModelKind,
        t: &[f64],
        q: &[f64],
        lower: &[f64],
        upper: &[f64],
    ) -> Option<LmFit> {
        let objective = |p: &[f64]| {
            let mut rss = 0.0;
            for (&ti, &qi) in t.iter().zip(q.iter()) {
                let r = qi - models::rate(kind, ti, p);
                if !r.is_finite() {
                    return OBJECTIVE_PENALTY;
                }
                rss += r * r;
            }
            rss
        };

        let global = differential_evolution(&objective, lower, upper, &self.options.de)?;
        let rss = objective(&global);
        if rss >= OBJECTIVE_PENALTY {
            return None;
        }

        let model = |ti: f64, p: &[f64]| models::rate(kind, ti, p);
        if let Some(refined) =
            levenberg_marquardt(&model, t, q, &global, lower, upper, &self.options.lm)
        {
            return Some(refined);
        }

        let k = global.len();
        Some(LmFit {
            params: global,
            covariance: nalgebra::DMatrix::zeros(k, k),
            rss,
            n_evals: 0,
        })
    }

    fn build_result(&self, kind: ModelKind, t: &[f64], q: &[f64], fit: LmFit) -> FitResult {
        let n = t.len();
        let k = fit.params.len();

        let predicted: Vec<f64> = t.iter().map(|&ti| models::rate(kind, ti, &fit.params)).collect();
        let residuals: Vec<f64> = q.iter().zip(predicted.iter()).map(|(a, p)| a - p).collect();

        let rss: f64 = residuals.iter().map(|r| r * r).sum();
        let mean = q.iter().sum::<f64>() / n as f64;
        let ss_tot: f64 = q.iter().map(|v| (v - mean) * (v - mean)).sum();
        let r_squared = if ss_tot > 0.0 { 1.0 - rss / ss_tot } else { 0.0 };
        let rmse = (rss / n as f64).sqrt();

        // Ranking-only information criteria: n·ln(RSS/n) + penalty. This
        // deliberately omits the Gaussian normalization constant used by the
        // diagnostics module; the two are not comparable in absolute value.
        let (aic, bic) = if rss > 0.0 {
            let n_f = n as f64;
            let base = n_f * (rss / n_f).ln();
            (base + 2.0 * k as f64, base + k as f64 * n_f.ln())
        } else {
            // Degenerate perfect fit: guard against ln(0) without NaN/Inf
            // propagation into comparisons.
            (f64::NEG_INFINITY, f64::NEG_INFINITY)
        };

        let covariance: Vec<Vec<f64>> = (0..fit.covariance.nrows())
            .map(|i| (0..fit.covariance.ncols()).map(|j| fit.covariance[(i, j)]).collect())
            .collect();

        FitResult {
            model_type: kind,
            parameters: ModelParams::from_ordered(kind, &fit.params),
            covariance: Some(covariance),
            r_squared,
            rmse,
            aic,
            bic,
            residuals,
            success: true,
            message: "Fit converged successfully".to_string(),
        }
    }
}
