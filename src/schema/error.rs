//! Error types for schema lookup and registry construction.

use thiserror::Error;

/// Errors raised by the schema registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The message type is not registered.
    #[error("unknown message type '{0}'")]
    UnknownType(String),

    /// A schema definition is internally inconsistent.
    #[error("invalid schema definition for '{type_id}': {reason}")]
    InvalidDefinition {
        /// The offending type identifier.
        type_id: String,
        /// Description of the inconsistency.
        reason: String,
    },

    /// A schema attempted to claim a reserved type identifier.
    #[error("message type '{0}' is reserved")]
    ReservedTypeId(String),

    /// Two schema definitions share a type identifier.
    #[error("duplicate message type '{0}'")]
    DuplicateTypeId(String),

    /// A registry document could not be parsed.
    #[error("failed to load schema registry: {0}")]
    Load(String),
}

impl SchemaError {
    /// Creates an invalid definition error.
    #[must_use]
    pub fn invalid_definition(type_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            type_id: type_id.into(),
            reason: reason.into(),
        }
    }
}
