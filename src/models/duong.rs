//! Duong decline model (SPE 137748), for fracture-dominated linear flow.
//!
//! `q(t) = qi · t^(−m) · e^(a/(1−m) · (t^(1−m) − 1))` with `qi` the rate at
//! `t = 1` month, not the peak rate. Time must be strictly positive; inputs
//! near zero are clamped to a small floor before powers and logs.
//!
//! Cumulative uses Duong's identity `Np(t) = q(t)·t / a`. `time_to_rate` has
//! no closed form and is solved by bounded binary search.

/// Floor applied to `t` to keep powers and the exponent well-defined.
const T_FLOOR: f64 = 1e-10;

pub fn duong_rate(t: f64, qi: f64, a: f64, m: f64) -> f64 {
    let t = t.max(T_FLOOR);
    if (m - 1.0).abs() < 1e-12 {
        // m = 1 limit: q(t) = qi · t^(-a), a pure power law.
        return qi * t.powf(-a);
    }
    let exponent = (a / (1.0 - m)) * (t.powf(1.0 - m) - 1.0);
    qi * t.powf(-m) * exponent.exp()
}

/// Duong's identity: cumulative is proportional to rate × time.
pub fn duong_cumulative(t: f64, qi: f64, a: f64, m: f64) -> f64 {
    if a <= 0.0 {
        return 0.0;
    }
    let t = t.max(T_FLOOR);
    duong_rate(t, qi, a, m) * t / a
}

/// Numerical solve for the time at which the rate reaches `q`.
///
/// Binary search over `[0.01, 10_000]` months, assuming the rate is
/// monotonically non-increasing over the searched range (true for `m > 1`).
pub fn duong_time_to_rate(q: f64, qi: f64, a: f64, m: f64) -> f64 {
    if q <= 0.0 || qi <= 0.0 || q >= qi {
        return 0.0;
    }
    let (mut t_low, mut t_high) = (0.01_f64, 10_000.0_f64);
    for _ in 0..100 {
        let t_mid = (t_low + t_high) / 2.0;
        if duong_rate(t_mid, qi, a, m) > q {
            t_low = t_mid;
        } else {
            t_high = t_mid;
        }
        if (t_high - t_low).abs() < 1e-3 {
            break;
        }
    }
    (t_low + t_high) / 2.0
}
