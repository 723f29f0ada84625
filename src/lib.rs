//! `decline-curves` library crate.
//!
//! A pure, synchronous decline curve analysis (DCA) engine:
//!
//! - six decline laws (Arps exponential/hyperbolic/harmonic, modified
//!   hyperbolic, stretched exponential, Duong) with analytic cumulatives
//! - bounded nonlinear least-squares fitting with a global-search fallback
//! - forecast projection under an economic rate cutoff
//! - Monte Carlo EUR estimation with SPE/PRMS percentile labeling
//! - standalone goodness-of-fit diagnostics
//!
//! The engine consumes plain numeric sample arrays and produces plain result
//! records. It owns no file, network, or database format; persistence,
//! request shaping, and staleness policy belong to the host.

pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod fit;
pub mod forecast;
pub mod math;
pub mod models;
pub mod monte_carlo;
