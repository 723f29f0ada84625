//! End-to-end pipeline test: synthetic decline history → fit → forecast →
//! Monte Carlo EUR → diagnostics.

use std::collections::BTreeMap;

use decline_curves::diagnostics::compute_diagnostics;
use decline_curves::domain::{ForecastConfig, ModelKind, ProductionSample, SimulationConfig};
use decline_curves::fit::CurveFitter;
use decline_curves::forecast::generate_forecast;
use decline_curves::models;
use decline_curves::monte_carlo::{DistributionSpec, MonteCarloSimulator};

/// Noiseless exponential history: qi = 1000 bbl/day, di = 0.08 1/month,
/// 24 monthly observations.
fn synthetic_history() -> (Vec<f64>, Vec<f64>) {
    let t: Vec<f64> = (0..24).map(|i| i as f64).collect();
    let q: Vec<f64> = t.iter().map(|&ti| 1000.0 * (-0.08 * ti).exp()).collect();
    (t, q)
}

#[test]
fn fit_forecast_simulate_pipeline() {
    let (t, q) = synthetic_history();
    let fitter = CurveFitter::new();

    // Auto-fit ranks every converged model by AIC; the exponential family
    // should fit this data essentially exactly.
    let ranked = fitter.auto_fit(&t, &q);
    assert!(!ranked.is_empty());
    for pair in ranked.windows(2) {
        assert!(pair[0].aic <= pair[1].aic);
    }
    let best = &ranked[0];
    assert!(best.success);
    assert!(best.r_squared > 0.999);

    // Forecast from the best fit under a 30 bbl/day cutoff.
    let forecast_config = ForecastConfig {
        forecast_months: 240.0,
        economic_limit: 30.0,
        time_step: 1.0,
    };
    let series = generate_forecast(best.model_type, &best.parameters, &forecast_config).unwrap();
    assert!(!series.is_empty());
    assert!(series.rate.iter().all(|&r| r >= 30.0));
    for pair in series.cumulative.windows(2) {
        assert!(pair[1] >= pair[0]);
    }

    // Monte Carlo around the fitted parameters.
    let mut distributions = BTreeMap::new();
    distributions.insert(
        "qi".to_string(),
        DistributionSpec::Lognormal {
            mean: best.parameters.get("qi").unwrap(),
            std: 100.0,
        },
    );
    let sim_config = SimulationConfig {
        economic_limit: 30.0,
        iterations: 1000,
        ..SimulationConfig::default()
    };
    let mc = MonteCarloSimulator::new()
        .run(best.model_type, &best.parameters, &distributions, &sim_config)
        .unwrap();
    assert!(mc.eur_p10 >= mc.eur_p50 && mc.eur_p50 >= mc.eur_p90);
    assert_eq!(mc.eur_distribution.len(), 1000);

    // The P50 should bracket the deterministic forecast's final cumulative.
    let final_cum = *series.cumulative.last().unwrap();
    assert!(mc.eur_p50 > 0.5 * final_cum && mc.eur_p50 < 2.0 * final_cum);

    // Diagnostics on the winning fit's predictions.
    let predicted: Vec<f64> = {
        let values = best.parameters.to_ordered(best.model_type).unwrap();
        t.iter().map(|&ti| models::rate(best.model_type, ti, &values)).collect()
    };
    let metrics =
        compute_diagnostics(&q, &predicted, best.model_type.param_count()).unwrap();
    assert!(metrics.r_squared > 0.999);
    assert!(metrics.rmse < 1.0);
    assert!(!metrics.aic.is_nan() && !metrics.bic.is_nan());
}

#[test]
fn single_model_fit_recovers_reference_parameters() {
    let (t, q) = synthetic_history();
    let samples: Vec<ProductionSample> = t
        .iter()
        .zip(q.iter())
        .map(|(&time_months, &rate)| ProductionSample { time_months, rate })
        .collect();
    let result = CurveFitter::new().fit_samples(&samples, ModelKind::Exponential, None);
    assert!(result.success, "{}", result.message);

    let qi = result.parameters.get("qi").unwrap();
    let di = result.parameters.get("di").unwrap();
    assert!((qi - 1000.0).abs() / 1000.0 < 0.05);
    assert!((di - 0.08).abs() / 0.08 < 0.10);
    assert!(result.r_squared > 0.999);
    assert_eq!(result.residuals.len(), t.len());

    let cov = result.covariance.as_ref().unwrap();
    assert_eq!(cov.len(), 2);
    assert_eq!(cov[0].len(), 2);
}
