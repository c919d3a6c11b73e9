//! Extractor for formats that are already text.

use crate::conversion::domain::{FileFormat, Payload};
use crate::conversion::error::{ConversionError, ConversionResult};
use crate::conversion::ports::ContentExtractor;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::debug;

const SERVICE: &str = "textual extractor";

/// Decodes inline plain text, Markdown and JSON payloads.
///
/// JSON is re-rendered pretty-printed; Markdown is returned as written.
/// Remote payloads and binary document formats need a fetching or parsing
/// backend, so they are reported as external service failures.
///
/// # Examples
///
/// ```
/// use palaver::conversion::adapters::TextualExtractor;
/// use palaver::conversion::domain::{FileFormat, Payload};
///
/// let text = TextualExtractor::decode(&Payload::Base64("aGVsbG8=".into()), FileFormat::Txt)
///     .expect("plain text decodes");
/// assert_eq!(text, "hello");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextualExtractor;

impl TextualExtractor {
    /// Decodes `payload` as `format` without awaiting anything.
    ///
    /// # Errors
    ///
    /// Returns `ConversionError::ExternalService` for URLs and binary
    /// formats, and `ConversionError::InvalidPayload` for content that is
    /// not valid base64, UTF-8 or JSON.
    pub fn decode(payload: &Payload, format: FileFormat) -> ConversionResult<String> {
        if let Payload::Url(url) = payload {
            return Err(ConversionError::external(
                SERVICE,
                format!("cannot fetch '{url}'"),
            ));
        }
        if !format.is_textual() {
            return Err(ConversionError::external(
                SERVICE,
                format!("no parser attached for {format} documents"),
            ));
        }

        let bytes = payload.decode()?;
        let text = String::from_utf8(bytes)
            .map_err(|err| ConversionError::InvalidPayload(format!("utf-8: {err}")))?;
        debug!(%format, chars = text.chars().count(), "decoded textual payload");

        if format == FileFormat::Json {
            pretty_json(&text)
        } else {
            Ok(text)
        }
    }
}

/// Re-renders a JSON document with four-space indentation.
fn pretty_json(text: &str) -> ConversionResult<String> {
    let invalid = |err: serde_json::Error| ConversionError::InvalidPayload(format!("json: {err}"));
    let document: serde_json::Value = serde_json::from_str(text).map_err(invalid)?;
    let mut rendered = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut rendered, formatter);
    document.serialize(&mut serializer).map_err(invalid)?;
    String::from_utf8(rendered).map_err(|err| ConversionError::InvalidPayload(err.to_string()))
}

#[async_trait]
impl ContentExtractor for TextualExtractor {
    async fn extract(&self, payload: &Payload, format: FileFormat) -> ConversionResult<String> {
        Self::decode(payload, format)
    }
}
