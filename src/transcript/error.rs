//! Error types for transcript auditing and shared access.
//!
//! Uses `thiserror` for typed variants that callers can inspect.

use crate::message::domain::Author;
use crate::message::error::MessageError;
use crate::schema::{SchemaViolation, join_violations};
use thiserror::Error;

/// A transcript state the merge rules never produce.
///
/// Turn and part positions are zero-based.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    /// A turn has the same author as the turn before it.
    #[error("turn {turn} repeats the author of the previous turn ({author})")]
    RepeatedAuthor {
        /// Index of the second of the two turns.
        turn: usize,
        /// The shared author.
        author: Author,
    },

    /// A part's type is missing from the transcript's registry.
    #[error("turn {turn}, part {part}: type '{message_type}' is not registered")]
    UnregisteredType {
        /// Index of the offending turn.
        turn: usize,
        /// Index of the offending part within the turn.
        part: usize,
        /// The unregistered type identifier.
        message_type: String,
    },

    /// A part's value does not conform to the registered schema for its type.
    #[error(
        "turn {turn}, part {part}: value does not conform to '{message_type}': {}",
        join_violations(.violations)
    )]
    NonConformingPart {
        /// Index of the offending turn.
        turn: usize,
        /// Index of the offending part within the turn.
        part: usize,
        /// The part's type identifier.
        message_type: String,
        /// Each key that failed the registered schema.
        violations: Vec<SchemaViolation>,
    },
}

impl InvariantViolation {
    /// Returns the index of the turn the violation was found in.
    #[must_use]
    pub const fn turn(&self) -> usize {
        match self {
            Self::RepeatedAuthor { turn, .. }
            | Self::UnregisteredType { turn, .. }
            | Self::NonConformingPart { turn, .. } => *turn,
        }
    }
}

/// Errors raised through a [`crate::transcript::services::SharedTranscript`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranscriptAccessError {
    /// A writer panicked while holding the lock.
    #[error("transcript lock poisoned")]
    Poisoned,

    /// The underlying transcript operation failed.
    #[error(transparent)]
    Message(#[from] MessageError),
}
