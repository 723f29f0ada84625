//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - the closed set of decline model kinds (`ModelKind`)
//! - named parameter sets (`ModelParams`)
//! - engine outputs (`FitResult`, `ForecastSeries`, `MonteCarloResult`,
//!   `DiagnosticMetrics`)
//! - call configuration records (`ForecastConfig`, `SimulationConfig`)

pub mod types;

pub use types::*;
