//! Port for extracting text from file payloads.

use crate::conversion::domain::{FileFormat, Payload};
use crate::conversion::error::ConversionResult;
use async_trait::async_trait;

/// Turns a file payload into text a model can read.
///
/// Implementations may call out to document parsers or remote services;
/// failures surface as [`ConversionError::ExternalService`] and are never
/// replaced by placeholder text.
///
/// [`ConversionError::ExternalService`]: crate::conversion::error::ConversionError::ExternalService
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Extracts the text content of `payload`.
    ///
    /// # Errors
    ///
    /// Returns `ConversionError` if the payload cannot be read or the
    /// format is not supported by this extractor.
    async fn extract(&self, payload: &Payload, format: FileFormat) -> ConversionResult<String>;
}
