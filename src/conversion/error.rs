//! Error types for projecting transcripts into request messages.

use crate::message::error::MessageError;
use thiserror::Error;

/// Errors raised while extracting file content, transcribing audio or
/// projecting a transcript.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// The file format is not one the extractor understands.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// An extraction or transcription backend failed.
    #[error("{service} failed: {reason}")]
    ExternalService {
        /// The backend that failed.
        service: String,
        /// Why it failed.
        reason: String,
    },

    /// The transcript holds a part type that has no request projection.
    #[error("message type '{0}' cannot be projected into a request")]
    UnsupportedMessageType(String),

    /// A payload could not be decoded.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Reading a message attribute failed.
    #[error(transparent)]
    Message(#[from] MessageError),
}

impl ConversionError {
    /// Builds an [`ExternalService`](Self::ExternalService) failure.
    #[must_use]
    pub fn external(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for conversion operations.
pub type ConversionResult<T> = Result<T, ConversionError>;
