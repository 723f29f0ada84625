//! Decline model implementations.
//!
//! Models are implemented as small, pure functions so that fitting, forecast,
//! and simulation code can stay generic. Dispatch over [`crate::domain::ModelKind`]
//! lives in `model`; the individual laws live in their own modules:
//!
//! - `arps`: classical Arps exponential / hyperbolic / harmonic (1945)
//! - `modified_hyperbolic`: hyperbolic with a terminal exponential tail
//! - `sedm`: stretched exponential (Valkó & Lee, SPE 134231)
//! - `duong`: fracture-dominated linear flow (Duong, SPE 137748)

pub mod arps;
pub mod duong;
pub mod model;
pub mod modified_hyperbolic;
pub mod sedm;

pub use model::*;
