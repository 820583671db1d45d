//! Error types for the editor core.
//!
//! Geometry and data-model errors are defensive invariants handled by
//! local recovery (reset to a safe state); only persistence failures are
//! ever surfaced to the user.

use thiserror::Error;

/// Errors that can occur in the editor core.
#[derive(Error, Debug)]
pub enum EditorError {
    /// The four parallel collection arrays diverged in length.
    /// Fatal to the current mutation; nothing is partially applied.
    #[error("parallel array invariant violated: {detail}")]
    InvariantViolation {
        /// Description of the divergence
        detail: String,
    },

    /// An operation referenced a box index that does not exist
    /// (e.g. a stale selection after a delete).
    #[error("box index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// The offending index
        index: usize,
        /// The collection length at the time of the call
        len: usize,
    },

    /// The inbound initial state was missing required fields.
    /// Recovered by initializing an empty collection.
    #[error("malformed inbound state: {detail}")]
    MalformedInbound {
        /// Description of what was missing or unreadable
        detail: String,
    },

    /// The remote save call did not succeed. Surfaced to the user as a
    /// dismissable notification; local state is left unchanged.
    #[error("failed to persist boxes: {0}")]
    Persistence(String),
}

impl EditorError {
    /// Create an invariant violation error with a detail message.
    pub fn invariant(detail: impl Into<String>) -> Self {
        Self::InvariantViolation {
            detail: detail.into(),
        }
    }

    /// Create a malformed inbound state error.
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedInbound {
            detail: detail.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EditorError>;
