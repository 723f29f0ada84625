//! Engine error taxonomy.
//!
//! Two explicit tiers:
//!
//! - boundary/config validation (`InvalidConfig`, `InvalidDistribution`):
//!   rejected immediately, before any computation is spent
//! - numerical convergence and domain issues inside a per-fit or per-sample
//!   loop: absorbed into typed result objects (`FitResult.success = false`,
//!   Monte Carlo sample fallback) so callers get a partial, inspectable result
//!
//! `Numeric` only surfaces where no partial result exists to carry it.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Malformed request-level input: bad shapes, non-finite settings,
    /// unrecognized model names from the wire.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Monte Carlo distribution configuration error. Raised before any
    /// sampling begins, never deferred per-iteration.
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    /// Non-recoverable numeric domain failure.
    #[error("numeric error: {0}")]
    Numeric(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
