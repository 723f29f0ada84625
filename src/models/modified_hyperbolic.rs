//! Modified hyperbolic decline.
//!
//! Hyperbolic decline until the instantaneous decline rate
//! `d(t) = Di / (1 + b·Di·t)` falls to a terminal threshold `d_min`, then an
//! exponential tail at constant `d_min`. This caps the EUR overestimation of
//! pure hyperbolic decline when `b >= 1`.
//!
//! Switch point: `t_s = (Di − d_min) / (b·Di·d_min)`. When `d_min >= Di` the
//! model is pure exponential at `d_min` from `t = 0`.

use crate::models::arps::{
    exponential_rate, harmonic_time_to_rate, hyperbolic_cumulative, hyperbolic_rate,
    hyperbolic_time_to_rate,
};

/// Time at which the instantaneous decline rate reaches `d_min`.
///
/// Returns 0 when `d_min >= di` (pure exponential from the start).
pub fn switch_time(di: f64, b: f64, d_min: f64) -> f64 {
    if d_min >= di || b <= 0.0 || di <= 0.0 || d_min <= 0.0 {
        return 0.0;
    }
    (di - d_min) / (b * di * d_min)
}

pub fn modified_hyperbolic_rate(t: f64, qi: f64, di: f64, b: f64, d_min: f64) -> f64 {
    if d_min >= di {
        return exponential_rate(t, qi, d_min);
    }
    let t_switch = switch_time(di, b, d_min);
    if t <= t_switch {
        hyperbolic_rate(t, qi, di, b)
    } else {
        let q_switch = hyperbolic_rate(t_switch, qi, di, b);
        q_switch * (-d_min * (t - t_switch)).exp()
    }
}

/// Cumulative: hyperbolic up to the switch, then the hyperbolic cumulative at
/// the switch plus the exponential tail integral.
pub fn modified_hyperbolic_cumulative(t: f64, qi: f64, di: f64, b: f64, d_min: f64) -> f64 {
    if d_min >= di {
        return (qi / d_min) * (1.0 - (-d_min * t).exp());
    }
    let t_switch = switch_time(di, b, d_min);
    if t <= t_switch {
        return hyperbolic_cumulative(t, qi, di, b);
    }
    let q_switch = hyperbolic_rate(t_switch, qi, di, b);
    let cum_at_switch = hyperbolic_cumulative(t_switch, qi, di, b);
    cum_at_switch + (q_switch / d_min) * (1.0 - (-d_min * (t - t_switch)).exp())
}

/// Time to reach rate `q`, resolved against the phase that contains it.
pub fn modified_hyperbolic_time_to_rate(q: f64, qi: f64, di: f64, b: f64, d_min: f64) -> f64 {
    if q <= 0.0 || qi <= 0.0 || q >= qi {
        return 0.0;
    }
    if d_min >= di {
        return -(q / qi).ln() / d_min;
    }
    let t_switch = switch_time(di, b, d_min);
    let q_switch = hyperbolic_rate(t_switch, qi, di, b);
    if q >= q_switch {
        if (b - 1.0).abs() < 1e-10 {
            harmonic_time_to_rate(q, qi, di)
        } else {
            hyperbolic_time_to_rate(q, qi, di, b)
        }
    } else {
        t_switch + -(q / q_switch).ln() / d_min
    }
}

/// EUR as `t → ∞`: hyperbolic head plus `q_switch / d_min` exponential tail.
/// Always finite because the tail declines at `d_min > 0`.
pub fn modified_hyperbolic_eur(qi: f64, di: f64, b: f64, d_min: f64) -> Option<f64> {
    if d_min <= 0.0 || di <= 0.0 {
        return None;
    }
    if d_min >= di {
        return Some(qi / d_min);
    }
    let t_switch = switch_time(di, b, d_min);
    let q_switch = hyperbolic_rate(t_switch, qi, di, b);
    Some(hyperbolic_cumulative(t_switch, qi, di, b) + q_switch / d_min)
}
