//! Numeric workhorses: bounded nonlinear least squares and global search.
//!
//! The fitting layer composes these as an explicit two-strategy fallback
//! chain: bounded local Levenberg–Marquardt first, differential evolution
//! over the bound box when the local solve diverges, then one more local
//! refinement seeded at the global result.

pub mod diff_evolution;
pub mod levenberg_marquardt;

pub use diff_evolution::*;
pub use levenberg_marquardt::*;
