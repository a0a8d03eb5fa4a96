//! Error types surfaced by the diff core.
//!
//! Most failure modes of this crate are *value-level* signals rather than
//! errors: a budget that is exhausted is reported as a low `ratio`/a cost
//! above `max_cost`, never as an `Err`. Only programmer errors — shape
//! mismatches, malformed buffers, recursive inputs and unsupported oracle
//! configurations — produce a [`DiffError`].

use thiserror::Error;

/// Errors returned by the public entry points of this crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiffError {
    /// A 2D entry point was given matrices of differing rank or incompatible
    /// trailing dimensions.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// [`nested`](crate::nested) found a container reachable from itself
    /// through both `a` and `b` at the same recursion step.
    #[error("recursive nesting of inputs")]
    RecursiveInput,

    /// No native fast path exists for the requested oracle/element type and
    /// a fast path was required.
    #[error("oracle has no fast path for this element type")]
    UnsupportedOracle,

    /// The caller-provided output buffer does not have length `n + m`.
    #[error("output buffer length {actual} does not match n+m={expected}")]
    BufferLength {
        /// Required buffer length.
        expected: usize,
        /// Length of the buffer that was actually given.
        actual: usize,
    },
}
