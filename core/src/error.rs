//! The error type shared by every fallible operation in this crate.

use thiserror::Error;

/// Failure modes of the cryptanalytic core.
///
/// Errors raised while evaluating one tagging or one `(k, K)` hypothesis are local: the
/// caller drops that candidate and keeps enumerating (see [`crate::CcCrack::run`]).
/// Errors raised while constructing a [`crate::CcCrack`] are fatal and propagate to the
/// driver.
#[derive(Error, Debug)]
pub enum Error {
    /// The input contains no valid symbol prefix.
    #[error("input contains no valid symbol prefix")]
    InvalidCapture,
    /// Opening, stat-ing, or mapping the symbol file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A parameter is out of range or contradictory (`bps > 6`, `k >= n`, `K == 0`, ...).
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    /// A heap or matrix allocation failed.
    #[error("allocation failed: {0}")]
    Allocation(String),
    /// A reduction precondition was violated. This indicates a bug in this crate.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}
