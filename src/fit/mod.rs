//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - clean raw (time, rate) samples and validate there is enough to fit
//! - build per-model bounds and physics-informed initial guesses (`bounds`)
//! - run the local → global → refine fallback chain and attach fit quality
//!   metrics (`fitter`)
//! - fit every model and rank by AIC (`auto_fit`)

pub mod bounds;
pub mod fitter;

pub use bounds::*;
pub use fitter::*;
