//! # Error Hierarchy
//!
//! Structured error types for the I/O-free half of the gateway client, built
//! with `thiserror`. Each error is raised before any request leaves the
//! process, so a caller that sees one of these knows nothing was sent.

use thiserror::Error;

/// Top-level error type for `braintree-core`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The caller supplied attribute keys the request signature does not permit.
    #[error(transparent)]
    InvalidKeys(#[from] InvalidKeysError),

    /// A resource identifier is missing or malformed.
    #[error(transparent)]
    InvalidId(#[from] InvalidIdError),

    /// Digest computation or verification failure.
    #[error(transparent)]
    Digest(#[from] DigestError),
}

/// Attribute keys rejected by a request signature.
///
/// `keys` is sorted lexicographically and never empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid keys: {}", .keys.join(", "))]
pub struct InvalidKeysError {
    /// Fully-qualified bracketed paths, e.g. `creditCard[bogus]`.
    pub keys: Vec<String>,
}

impl InvalidKeysError {
    /// The offending paths joined the way they appear in the message.
    pub fn joined(&self) -> String {
        self.keys.join(", ")
    }
}

/// A missing or malformed resource identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidIdError {
    /// The identifier was empty.
    #[error("expected {kind} id to be set")]
    Missing {
        /// Human-readable resource kind, e.g. `customer`.
        kind: String,
    },

    /// The identifier contains characters outside the allowed set.
    #[error("{id} is an invalid {kind} id.")]
    Malformed {
        /// Human-readable resource kind.
        kind: String,
        /// The rejected identifier.
        id: String,
    },
}

/// Digest verification failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// The supplied digest is not 40 hex characters.
    #[error("digest is not a 40-character hex string: {0}")]
    Malformed(String),

    /// The supplied digest does not match the recomputed one.
    #[error("digest mismatch")]
    Mismatch,
}
