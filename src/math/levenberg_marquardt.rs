//! Bounded Levenberg–Marquardt nonlinear least squares.
//!
//! We repeatedly solve small curve-fit problems of the form:
//!
//! ```text
//! minimize Σ (y_i - f(t_i, p))^2   subject to  lower <= p <= upper
//! ```
//!
//! Implementation choices:
//! - Jacobians by forward differences with bound-aware steps (the model is
//!   cheap to evaluate and has 2–4 parameters).
//! - Bounds enforced by projecting each trial step onto the box. With the
//!   damped step this behaves like a trust-region solve near the boundary.
//! - The damped normal equations are solved via SVD with progressively looser
//!   tolerances, since decline laws can produce nearly collinear columns for
//!   extreme parameter values.

use nalgebra::{DMatrix, DVector};

/// Failure-tolerant objective value used when the model goes non-finite.
const BAD_COST: f64 = 1e20;

/// Options for the local solve.
#[derive(Debug, Clone)]
pub struct LmOptions {
    /// Cap on residual-vector evaluations (generous, like `maxfev`).
    pub max_evals: usize,
    /// Cap on accepted LM iterations.
    pub max_iters: usize,
    /// Relative cost-reduction convergence threshold.
    pub ftol: f64,
    /// Step-norm convergence threshold.
    pub xtol: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_evals: 10_000,
            max_iters: 200,
            ftol: 1e-10,
            xtol: 1e-10,
        }
    }
}

/// A converged local fit.
#[derive(Debug, Clone)]
pub struct LmFit {
    pub params: Vec<f64>,
    /// Parameter covariance `s² (JᵀJ)⁻¹`; all zeros when the normal matrix
    /// could not be inverted.
    pub covariance: DMatrix<f64>,
    pub rss: f64,
    pub n_evals: usize,
}

/// Fit `f(t, p)` to `(t, y)` within `[lower, upper]`.
///
/// Returns `None` when the solve diverges: non-finite residuals at the start,
/// repeated linear-solve failures, or the caps hit without meeting either
/// convergence threshold. Callers fall back to a global search in that case.
pub fn levenberg_marquardt(
    f: &dyn Fn(f64, &[f64]) -> f64,
    t: &[f64],
    y: &[f64],
    p0: &[f64],
    lower: &[f64],
    upper: &[f64],
    opts: &LmOptions,
) -> Option<LmFit> {
    let n = t.len();
    let k = p0.len();
    if n == 0 || k == 0 || lower.len() != k || upper.len() != k {
        return None;
    }

    let mut p: Vec<f64> = p0
        .iter()
        .zip(lower.iter().zip(upper.iter()))
        .map(|(&v, (&lo, &hi))| v.clamp(lo, hi))
        .collect();

    let mut n_evals = 0usize;
    let mut residuals = eval_residuals(f, t, y, &p, &mut n_evals)?;
    let mut cost = residuals.norm_squared();
    if !cost.is_finite() {
        return None;
    }

    let mut lambda = 1e-3;
    let mut converged = false;

    for _ in 0..opts.max_iters {
        let jac = jacobian(f, t, y, &p, upper, &residuals, &mut n_evals)?;
        let jtj = jac.transpose() * &jac;
        let jtr = jac.transpose() * &residuals;

        let mut accepted = false;
        // Inner damping loop: grow lambda until a step reduces the cost.
        for _ in 0..16 {
            if n_evals >= opts.max_evals {
                break;
            }
            let mut damped = jtj.clone();
            for i in 0..k {
                damped[(i, i)] += lambda * jtj[(i, i)].max(1e-12);
            }
            let Some(step) = solve_spd(&damped, &(-&jtr)) else {
                lambda *= 10.0;
                continue;
            };

            let p_trial: Vec<f64> = p
                .iter()
                .zip(step.iter())
                .zip(lower.iter().zip(upper.iter()))
                .map(|((&pi, &si), (&lo, &hi))| (pi + si).clamp(lo, hi))
                .collect();

            let trial = eval_residuals(f, t, y, &p_trial, &mut n_evals);
            let trial_cost = trial.as_ref().map_or(BAD_COST, |r| r.norm_squared());

            if trial_cost.is_finite() && trial_cost < cost {
                let step_norm = step.norm();
                let p_norm = p.iter().map(|v| v * v).sum::<f64>().sqrt().max(1.0);
                let reduction = (cost - trial_cost) / cost.max(1e-300);
                p = p_trial;
                cost = trial_cost;
                // trial is Some here since trial_cost is finite
                if let Some(r) = trial {
                    residuals = r;
                }
                lambda = (lambda / 3.0).max(1e-12);
                accepted = true;
                if reduction < opts.ftol || step_norm < opts.xtol * p_norm {
                    converged = true;
                }
                break;
            }
            lambda *= 10.0;
        }

        if converged || n_evals >= opts.max_evals {
            break;
        }
        if !accepted {
            // No downhill step at any damping level: converged only if we sit
            // at a stationary point, otherwise report failure.
            converged = jtr.norm() < 1e-8 * (1.0 + cost.sqrt());
            break;
        }
    }

    if !converged || !cost.is_finite() {
        return None;
    }

    let jac = jacobian(f, t, y, &p, upper, &residuals, &mut n_evals)?;
    let covariance = covariance_from_jacobian(&jac, cost, n, k);

    Some(LmFit {
        params: p,
        covariance,
        rss: cost,
        n_evals,
    })
}

/// `s² (JᵀJ)⁻¹` with `s² = RSS / (n − k)`; zeros when singular.
pub fn covariance_from_jacobian(jac: &DMatrix<f64>, rss: f64, n: usize, k: usize) -> DMatrix<f64> {
    let jtj = jac.transpose() * jac;
    let dof = n.saturating_sub(k).max(1) as f64;
    let s2 = rss / dof;

    let svd = jtj.clone().svd(true, true);
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(inv) = svd.clone().pseudo_inverse(tol) {
            let cov = inv * s2;
            if cov.iter().all(|v| v.is_finite()) {
                return cov;
            }
        }
    }
    DMatrix::zeros(k, k)
}

fn eval_residuals(
    f: &dyn Fn(f64, &[f64]) -> f64,
    t: &[f64],
    y: &[f64],
    p: &[f64],
    n_evals: &mut usize,
) -> Option<DVector<f64>> {
    *n_evals += 1;
    let mut out = DVector::zeros(t.len());
    for i in 0..t.len() {
        let v = y[i] - f(t[i], p);
        if !v.is_finite() {
            return None;
        }
        out[i] = v;
    }
    Some(out)
}

/// Forward-difference Jacobian of the residual vector, stepping backwards at
/// the upper bound so evaluation stays inside the box.
fn jacobian(
    f: &dyn Fn(f64, &[f64]) -> f64,
    t: &[f64],
    y: &[f64],
    p: &[f64],
    upper: &[f64],
    base: &DVector<f64>,
    n_evals: &mut usize,
) -> Option<DMatrix<f64>> {
    let n = t.len();
    let k = p.len();
    let mut jac = DMatrix::zeros(n, k);
    let sqrt_eps = f64::EPSILON.sqrt();

    for j in 0..k {
        let mut h = sqrt_eps * p[j].abs().max(1.0);
        if p[j] + h > upper[j] {
            h = -h;
        }
        let mut p_step = p.to_vec();
        p_step[j] += h;
        let stepped = eval_residuals(f, t, y, &p_step, n_evals)?;
        for i in 0..n {
            jac[(i, j)] = (stepped[i] - base[i]) / h;
        }
    }
    Some(jac)
}

/// Solve the (symmetric positive definite after damping) normal equations,
/// falling back to SVD with progressively looser tolerances.
fn solve_spd(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    if let Some(chol) = a.clone().cholesky() {
        let x = chol.solve(b);
        if x.iter().all(|v| v.is_finite()) {
            return Some(x);
        }
    }
    let svd = a.clone().svd(true, true);
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(x) = svd.solve(b, tol) {
            if x.iter().all(|v| v.is_finite()) {
                return Some(x);
            }
        }
    }
    None
}
