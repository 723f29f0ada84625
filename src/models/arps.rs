//! Classical Arps decline laws (J.J. Arps, 1945).
//!
//! General form: `q(t) = qi / (1 + b·Di·t)^(1/b)` with the exponential
//! (`b = 0`) and harmonic (`b = 1`) limits implemented directly.
//!
//! Units convention: time in months, rate per day, decline rate in 1/month.

/// Tolerance below which the hyperbolic exponent is treated as harmonic.
const B_HARMONIC_EPS: f64 = 1e-10;

/// Exponential decline: `q(t) = qi · e^(−Di·t)`.
///
/// Constant fractional decline per unit time; the most conservative law,
/// often used for the terminal phase.
pub fn exponential_rate(t: f64, qi: f64, di: f64) -> f64 {
    qi * (-di * t).exp()
}

/// Cumulative production: `Np(t) = (qi / Di) · (1 − e^(−Di·t))`.
pub fn exponential_cumulative(t: f64, qi: f64, di: f64) -> f64 {
    if di <= 0.0 {
        return qi * t;
    }
    (qi / di) * (1.0 - (-di * t).exp())
}

/// Time to reach rate `q`: `t = −ln(q/qi) / Di`.
pub fn exponential_time_to_rate(q: f64, qi: f64, di: f64) -> f64 {
    if q <= 0.0 || qi <= 0.0 || q >= qi || di <= 0.0 {
        return 0.0;
    }
    -(q / qi).ln() / di
}

/// EUR as `t → ∞`: `qi / Di`, always finite.
pub fn exponential_eur(qi: f64, di: f64) -> Option<f64> {
    if di <= 0.0 {
        return None;
    }
    Some(qi / di)
}

/// Hyperbolic decline: `q(t) = qi / (1 + b·Di·t)^(1/b)`.
///
/// EUR is finite only for `b < 1`; unconventional wells often exhibit
/// `b > 1` during transient flow, which always needs an economic cutoff.
pub fn hyperbolic_rate(t: f64, qi: f64, di: f64, b: f64) -> f64 {
    if b.abs() < B_HARMONIC_EPS {
        return exponential_rate(t, qi, di);
    }
    let base = 1.0 + b * di * t;
    if base <= 0.0 {
        return 0.0;
    }
    qi / base.powf(1.0 / b)
}

/// Cumulative production for hyperbolic decline:
///
/// `Np(t) = (qi^b / ((1−b)·Di)) · (qi^(1−b) − q(t)^(1−b))`
///
/// with the harmonic logarithmic limit taken when `b ≈ 1`.
pub fn hyperbolic_cumulative(t: f64, qi: f64, di: f64, b: f64) -> f64 {
    if di <= 0.0 {
        return qi * t;
    }
    if (b - 1.0).abs() < B_HARMONIC_EPS {
        return harmonic_cumulative(t, qi, di);
    }
    if b.abs() < B_HARMONIC_EPS {
        return exponential_cumulative(t, qi, di);
    }
    let q_t = hyperbolic_rate(t, qi, di, b);
    (qi.powf(b) / ((1.0 - b) * di)) * (qi.powf(1.0 - b) - q_t.powf(1.0 - b))
}

/// Time to reach rate `q`: `t = ((qi/q)^b − 1) / (b·Di)`.
pub fn hyperbolic_time_to_rate(q: f64, qi: f64, di: f64, b: f64) -> f64 {
    if q <= 0.0 || qi <= 0.0 || q >= qi || di <= 0.0 {
        return 0.0;
    }
    if b.abs() < B_HARMONIC_EPS {
        return exponential_time_to_rate(q, qi, di);
    }
    ((qi / q).powf(b) - 1.0) / (b * di)
}

/// EUR as `t → ∞`: `qi / ((1−b)·Di)` for `b < 1`, infinite otherwise.
pub fn hyperbolic_eur(qi: f64, di: f64, b: f64) -> Option<f64> {
    if di <= 0.0 || b >= 1.0 {
        return None;
    }
    if b.abs() < B_HARMONIC_EPS {
        return exponential_eur(qi, di);
    }
    Some(qi / ((1.0 - b) * di))
}

/// Harmonic decline: `q(t) = qi / (1 + Di·t)`.
///
/// Special case of hyperbolic with `b = 1`. EUR diverges as `t → ∞`, so a
/// harmonic forecast always requires an economic limit.
pub fn harmonic_rate(t: f64, qi: f64, di: f64) -> f64 {
    let base = 1.0 + di * t;
    if base <= 0.0 {
        return 0.0;
    }
    qi / base
}

/// Cumulative production: `Np(t) = (qi / Di) · ln(1 + Di·t)`.
pub fn harmonic_cumulative(t: f64, qi: f64, di: f64) -> f64 {
    if di <= 0.0 {
        return qi * t;
    }
    let base = 1.0 + di * t;
    if base <= 0.0 {
        return 0.0;
    }
    (qi / di) * base.ln()
}

/// Time to reach rate `q`: `t = (qi/q − 1) / Di`.
pub fn harmonic_time_to_rate(q: f64, qi: f64, di: f64) -> f64 {
    if q <= 0.0 || qi <= 0.0 || q >= qi || di <= 0.0 {
        return 0.0;
    }
    (qi / q - 1.0) / di
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_round_trips_time_to_rate() {
        let (qi, di) = (1000.0, 0.08);
        let t = exponential_time_to_rate(50.0, qi, di);
        assert!((exponential_rate(t, qi, di) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn hyperbolic_near_one_matches_harmonic() {
        let (qi, di, t) = (800.0, 0.1, 24.0);
        let hyp = hyperbolic_cumulative(t, qi, di, 1.0 + 1e-12);
        let har = harmonic_cumulative(t, qi, di);
        assert!((hyp - har).abs() < 1e-6, "hyp={hyp} har={har}");
    }

    #[test]
    fn hyperbolic_eur_finite_only_below_b_one() {
        assert!(hyperbolic_eur(500.0, 0.05, 0.8).is_some());
        assert!(hyperbolic_eur(500.0, 0.05, 1.0).is_none());
        assert!(hyperbolic_eur(500.0, 0.05, 1.4).is_none());
    }

    #[test]
    fn rates_are_non_increasing() {
        let (qi, di) = (1200.0, 0.12);
        let mut prev_e = f64::INFINITY;
        let mut prev_h = f64::INFINITY;
        let mut prev_a = f64::INFINITY;
        for i in 0..120 {
            let t = i as f64;
            let e = exponential_rate(t, qi, di);
            let h = hyperbolic_rate(t, qi, di, 0.9);
            let a = harmonic_rate(t, qi, di);
            assert!(e <= prev_e && h <= prev_h && a <= prev_a);
            assert!(e >= 0.0 && h >= 0.0 && a >= 0.0);
            prev_e = e;
            prev_h = h;
            prev_a = a;
        }
    }

    #[test]
    fn exponential_cumulative_approaches_eur() {
        let (qi, di) = (900.0, 0.15);
        let eur = exponential_eur(qi, di).unwrap();
        assert!(exponential_cumulative(600.0, qi, di) < eur);
        assert!((exponential_cumulative(600.0, qi, di) - eur).abs() / eur < 1e-6);
    }
}
