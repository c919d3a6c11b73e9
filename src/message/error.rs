//! Error types for message construction, mutation and composition.
//!
//! Uses `thiserror` for typed variants that callers can inspect. Every
//! variant is raised before any state is changed, so a failed operation
//! leaves the message exactly as it was.

use super::domain::Author;
use crate::schema::{SchemaError, SchemaViolation, join_violations};
use thiserror::Error;

/// Errors raised by single-part and composite message operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MessageError {
    /// Schema lookup failed, typically because the type is unknown.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A value or chunk does not satisfy the message type's schema.
    #[error(
        "value for message type '{message_type}' violates its schema: {}",
        join_violations(.violations)
    )]
    SchemaMismatch {
        /// The message type whose schema was violated.
        message_type: String,
        /// Every violation found.
        violations: Vec<SchemaViolation>,
    },

    /// A composite message would break its composition rules.
    #[error("invalid composite message: {0}")]
    InvalidComposition(#[from] CompositionError),

    /// A read referenced an attribute or metadata key that is not present.
    #[error("missing key '{0}'")]
    MissingKey(String),

    /// A structured representation could not be decoded.
    #[error("malformed structured value: {0}")]
    MalformedStructure(String),
}

impl MessageError {
    /// Creates a schema mismatch error.
    #[must_use]
    pub fn schema_mismatch(
        message_type: impl Into<String>,
        violations: Vec<SchemaViolation>,
    ) -> Self {
        Self::SchemaMismatch {
            message_type: message_type.into(),
            violations,
        }
    }

    /// Creates a malformed structure error.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedStructure(reason.into())
    }

    /// Returns `true` if the error reports an unregistered message type.
    #[must_use]
    pub const fn is_unknown_type(&self) -> bool {
        matches!(self, Self::Schema(SchemaError::UnknownType(_)))
    }

    /// Returns the attribute keys named by a schema mismatch.
    ///
    /// Returns an empty vector for every other variant.
    #[must_use]
    pub fn offending_keys(&self) -> Vec<&str> {
        match self {
            Self::SchemaMismatch { violations, .. } => {
                violations.iter().map(SchemaViolation::key).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Violations of the composite message invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// A composite must hold at least one part.
    #[error("a composite message must contain at least one part")]
    EmptyParts,

    /// Composites cannot nest.
    #[error("composite messages cannot contain parts of type '{0}'")]
    NestedComposite(String),

    /// Every part must share the composite's author.
    #[error("part authored by {found} cannot join a composite authored by {expected}")]
    AuthorMismatch {
        /// The composite's author.
        expected: Author,
        /// The author of the rejected part.
        found: Author,
    },

    /// A part index addressed past the end of the composite.
    #[error("part index {index} is out of range for a message with {len} parts")]
    PartIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of parts present.
        len: usize,
    },

    /// The transcript has no turns to modify.
    #[error("the transcript has no focus message")]
    NoFocus,
}
