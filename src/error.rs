//! Error taxonomy for the query core.

use thiserror::Error;

/// Errors returned by validation, serialization, compilation, and the registry.
///
/// Variants correspond to the semantic kinds a caller needs to distinguish,
/// not to where in the call stack the failure happened. Every message carries
/// its own path-context prefix (e.g. `"JOIN 2 condition: ..."`) so callers can
/// locate the offending builder call without a backtrace.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An IR fails one of the structural invariants in the validator.
    #[error("{0}")]
    Validation(String),

    /// A caller-supplied name does not match `^[A-Za-z_][A-Za-z0-9_]*$`.
    #[error("invalid identifier: {0}")]
    Identifier(String),

    /// JSON parse failure, or an unrecognized tag on deserialize.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A registry operation violated its uniqueness contract.
    #[error("registry error: {0}")]
    Registry(String),

    /// An unreachable variant or inconsistent state was reached during emission.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias used throughout the crate.
pub type Result<T> = core::result::Result<T, CoreError>;
