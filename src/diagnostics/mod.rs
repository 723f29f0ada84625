//! Standalone goodness-of-fit diagnostics.
//!
//! Computes quality metrics from actual vs. predicted arrays, independent of
//! the fitting path so any caller holding the two arrays can use it.
//!
//! AIC/BIC here use the full Gaussian log-likelihood formulation
//! (`LL = −n/2·(ln 2π + ln(RSS/n) + 1)`), which differs from the fitter's
//! ranking-only `n·ln(RSS/n) + penalty` by an additive normalization
//! constant. Each convention is internally consistent for relative
//! comparisons; the absolute values are not comparable across the two paths.

use crate::domain::DiagnosticMetrics;
use crate::error::{EngineError, EngineResult};

/// Compute comprehensive fit diagnostics.
///
/// `n_parameters` is the fitted model's parameter count `k`, used by the
/// adjusted R² and the information criteria.
pub fn compute_diagnostics(
    actual: &[f64],
    predicted: &[f64],
    n_parameters: usize,
) -> EngineResult<DiagnosticMetrics> {
    if actual.is_empty() {
        return Err(EngineError::InvalidConfig(
            "Diagnostics require at least one observation".to_string(),
        ));
    }
    if actual.len() != predicted.len() {
        return Err(EngineError::InvalidConfig(format!(
            "Actual/predicted length mismatch: {} vs {}",
            actual.len(),
            predicted.len()
        )));
    }

    let n = actual.len();
    let n_f = n as f64;
    let k = n_parameters;

    let residuals: Vec<f64> = actual.iter().zip(predicted.iter()).map(|(a, p)| a - p).collect();
    let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
    let mean = actual.iter().sum::<f64>() / n_f;
    let ss_tot: f64 = actual.iter().map(|v| (v - mean) * (v - mean)).sum();

    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    // Adjusted R² penalizes parameter count; undefined below n = k + 2.
    let adjusted_r_squared = if n > k + 1 {
        1.0 - (1.0 - r_squared) * (n_f - 1.0) / (n_f - k as f64 - 1.0)
    } else {
        r_squared
    };

    let rmse = (ss_res / n_f).sqrt();

    let data_range = actual.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
        - actual.iter().cloned().fold(f64::INFINITY, f64::min);
    let nrmse = if data_range > 0.0 { rmse / data_range } else { f64::INFINITY };

    let mae = residuals.iter().map(|r| r.abs()).sum::<f64>() / n_f;

    // MAPE over entries with nonzero actual values only.
    let mut mape_sum = 0.0;
    let mut mape_n = 0usize;
    for (r, a) in residuals.iter().zip(actual.iter()) {
        if *a != 0.0 {
            mape_sum += (r / a).abs();
            mape_n += 1;
        }
    }
    let mape = if mape_n > 0 {
        mape_sum / mape_n as f64 * 100.0
    } else {
        f64::INFINITY
    };

    let (aic, bic) = if ss_res > 0.0 {
        let log_likelihood =
            -n_f / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (ss_res / n_f).ln() + 1.0);
        (
            -2.0 * log_likelihood + 2.0 * k as f64,
            -2.0 * log_likelihood + k as f64 * n_f.ln(),
        )
    } else {
        // Degenerate perfect fit: guarded to −∞, never NaN.
        (f64::NEG_INFINITY, f64::NEG_INFINITY)
    };

    // Durbin-Watson over first differences of the residual sequence.
    // ≈2 means no autocorrelation; <2 positive (systematic misfit), >2 negative.
    let durbin_watson = if ss_res > 0.0 && n > 1 {
        residuals
            .windows(2)
            .map(|w| (w[1] - w[0]) * (w[1] - w[0]))
            .sum::<f64>()
            / ss_res
    } else {
        2.0
    };

    Ok(DiagnosticMetrics {
        r_squared,
        adjusted_r_squared,
        rmse,
        nrmse,
        mae,
        mape,
        aic,
        bic,
        durbin_watson,
        n_points: n,
        n_parameters: k,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_fit_is_guarded_not_nan() {
        let actual = [100.0, 90.0, 81.0, 72.9];
        let metrics = compute_diagnostics(&actual, &actual, 2).unwrap();

        assert_eq!(metrics.r_squared, 1.0);
        assert_eq!(metrics.rmse, 0.0);
        assert_eq!(metrics.aic, f64::NEG_INFINITY);
        assert_eq!(metrics.bic, f64::NEG_INFINITY);
        assert_eq!(metrics.durbin_watson, 2.0);
        assert!(!metrics.mape.is_nan());
    }

    #[test]
    fn constant_actuals_zero_sstot_gives_zero_r_squared() {
        let actual = [50.0, 50.0, 50.0];
        let predicted = [49.0, 50.0, 51.0];
        let metrics = compute_diagnostics(&actual, &predicted, 1).unwrap();
        assert_eq!(metrics.r_squared, 0.0);
        assert!(metrics.nrmse.is_infinite());
    }

    #[test]
    fn known_residuals_produce_known_metrics() {
        let actual = [10.0, 20.0, 30.0, 40.0];
        let predicted = [11.0, 19.0, 31.0, 39.0];
        let metrics = compute_diagnostics(&actual, &predicted, 2).unwrap();

        assert!((metrics.rmse - 1.0).abs() < 1e-12);
        assert!((metrics.mae - 1.0).abs() < 1e-12);
        // MAPE = mean(|1/10|, |1/20|, |1/30|, |1/40|) * 100
        let expected_mape = (0.1 + 0.05 + 1.0 / 30.0 + 0.025) / 4.0 * 100.0;
        assert!((metrics.mape - expected_mape).abs() < 1e-9);
        assert_eq!(metrics.n_points, 4);
        assert_eq!(metrics.n_parameters, 2);
    }

    #[test]
    fn adjusted_r_squared_falls_back_when_underdetermined() {
        let actual = [10.0, 12.0, 14.0];
        let predicted = [10.1, 11.9, 14.2];
        // n = 3, k = 2: n <= k + 1, so adjusted == plain.
        let metrics = compute_diagnostics(&actual, &predicted, 2).unwrap();
        assert_eq!(metrics.adjusted_r_squared, metrics.r_squared);
    }

    #[test]
    fn alternating_residuals_push_durbin_watson_above_two() {
        let actual = [10.0, 10.0, 10.0, 10.0, 10.0, 10.0];
        let predicted = [9.0, 11.0, 9.0, 11.0, 9.0, 11.0];
        let metrics = compute_diagnostics(&actual, &predicted, 1).unwrap();
        assert!(metrics.durbin_watson > 2.0);
    }

    #[test]
    fn zero_actuals_are_excluded_from_mape() {
        let actual = [0.0, 10.0];
        let predicted = [1.0, 9.0];
        let metrics = compute_diagnostics(&actual, &predicted, 1).unwrap();
        assert!((metrics.mape - 10.0).abs() < 1e-9);

        let all_zero = compute_diagnostics(&[0.0, 0.0], &[1.0, 1.0], 1).unwrap();
        assert!(all_zero.mape.is_infinite());
    }

    #[test]
    fn shape_errors_fail_fast() {
        assert!(compute_diagnostics(&[], &[], 1).is_err());
        assert!(compute_diagnostics(&[1.0, 2.0], &[1.0], 1).is_err());
    }
}
