//! Monte Carlo EUR estimation.
//!
//! Resamples decline parameters from configured probability distributions and
//! estimates the distribution of Estimated Ultimate Recovery:
//!
//! - `sampling`: distribution specs, validation, and seeded draws
//! - `simulator`: the per-draw economic-limit search and the SPE/PRMS
//!   percentile aggregation

pub mod sampling;
pub mod simulator;

pub use sampling::*;
pub use simulator::*;
