//! Port for transcribing audio payloads.

use crate::conversion::domain::Payload;
use crate::conversion::error::ConversionResult;
use async_trait::async_trait;

/// Turns recorded speech into text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioTranscriber: Send + Sync {
    /// Transcribes `payload`, whose encoding is named by `format` (a MIME
    /// type such as `audio/mpeg`).
    ///
    /// # Errors
    ///
    /// Returns `ConversionError::ExternalService` when transcription fails.
    async fn transcribe(&self, payload: &Payload, format: &str) -> ConversionResult<String>;
}
