//! Stretched exponential decline (SEDM), Valkó & Lee (SPE 134231).
//!
//! `q(t) = qi · e^(−(t/tau)^n)`. The cumulative uses the regularized lower
//! incomplete gamma function, and the EUR is finite for any parameter values,
//! unlike hyperbolic decline with `b >= 1`.

use statrs::function::gamma::{gamma, gamma_lr};

pub fn sedm_rate(t: f64, qi: f64, tau: f64, n: f64) -> f64 {
    if tau <= 0.0 || n <= 0.0 {
        return 0.0;
    }
    qi * (-(t / tau).powf(n)).exp()
}

/// Cumulative: `Np(t) = EUR_total · P(1/n, (t/tau)^n)` where
/// `EUR_total = (qi·tau/n) · Γ(1/n)` and `P` is the regularized lower
/// incomplete gamma function.
pub fn sedm_cumulative(t: f64, qi: f64, tau: f64, n: f64) -> f64 {
    if tau <= 0.0 || n <= 0.0 || t <= 0.0 {
        return 0.0;
    }
    let eur_total = (qi * tau / n) * gamma(1.0 / n);
    eur_total * gamma_lr(1.0 / n, (t / tau).powf(n))
}

/// Time to reach rate `q`: `t = tau · (−ln(q/qi))^(1/n)`.
pub fn sedm_time_to_rate(q: f64, qi: f64, tau: f64, n: f64) -> f64 {
    if q <= 0.0 || qi <= 0.0 || q >= qi || tau <= 0.0 || n <= 0.0 {
        return 0.0;
    }
    tau * (-(q / qi).ln()).powf(1.0 / n)
}

/// EUR as `t → ∞`: `(qi·tau/n) · Γ(1/n)`, always finite.
pub fn sedm_eur(qi: f64, tau: f64, n: f64) -> Option<f64> {
    if tau <= 0.0 || n <= 0.0 {
        return None;
    }
    Some((qi * tau / n) * gamma(1.0 / n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::arps::{exponential_cumulative, exponential_rate};

    #[test]
    fn n_equal_one_reduces_to_exponential() {
        // With n = 1 and tau = 1/Di, SEDM is pure exponential decline.
        let (qi, di) = (600.0, 0.07);
        let tau = 1.0 / di;
        for t in [1.0, 12.0, 60.0] {
            let r = sedm_rate(t, qi, tau, 1.0);
            assert!((r - exponential_rate(t, qi, di)).abs() < 1e-9);
            let c = sedm_cumulative(t, qi, tau, 1.0);
            assert!((c - exponential_cumulative(t, qi, di)).abs() < 1e-6);
        }
    }

    #[test]
    fn cumulative_converges_to_eur() {
        let (qi, tau, n) = (800.0, 20.0, 0.6);
        let eur = sedm_eur(qi, tau, n).unwrap();
        let late = sedm_cumulative(5000.0, qi, tau, n);
        assert!(late <= eur);
        assert!((eur - late) / eur < 1e-6);
    }

    #[test]
    fn time_to_rate_round_trips() {
        let (qi, tau, n) = (800.0, 20.0, 0.6);
        let t = sedm_time_to_rate(50.0, qi, tau, n);
        assert!((sedm_rate(t, qi, tau, n) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn rate_is_non_increasing() {
        let (qi, tau, n) = (800.0, 20.0, 0.6);
        let mut prev = f64::INFINITY;
        for i in 0..240 {
            let r = sedm_rate(i as f64, qi, tau, n);
            assert!(r <= prev && r >= 0.0);
            prev = r;
        }
    }
}
