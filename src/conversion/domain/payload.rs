//! Content payloads handed to extraction and transcription backends.

use crate::conversion::error::ConversionError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Where the content of a file or audio part lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Content reachable at a URL.
    Url(String),
    /// Inline content encoded as standard base64.
    Base64(String),
    /// Inline raw bytes.
    Bytes(Vec<u8>),
}

impl Payload {
    /// Builds a base64 payload from the raw bytes stored in a message
    /// attribute.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::InvalidPayload`] when the bytes are not
    /// UTF-8 text.
    pub fn base64_from_utf8(bytes: &[u8]) -> Result<Self, ConversionError> {
        std::str::from_utf8(bytes)
            .map(|encoded| Self::Base64(encoded.trim().to_owned()))
            .map_err(|err| ConversionError::InvalidPayload(format!("base64 text: {err}")))
    }

    /// Whether the content must be fetched rather than decoded locally.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    /// Decodes inline content into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::InvalidPayload`] for URL payloads and for
    /// malformed base64.
    pub fn decode(&self) -> Result<Vec<u8>, ConversionError> {
        match self {
            Self::Url(url) => Err(ConversionError::InvalidPayload(format!(
                "'{url}' is a URL, not inline content"
            ))),
            Self::Base64(encoded) => STANDARD
                .decode(encoded)
                .map_err(|err| ConversionError::InvalidPayload(format!("base64: {err}"))),
            Self::Bytes(bytes) => Ok(bytes.clone()),
        }
    }

    /// Renders the payload as a URL: remote payloads as-is, inline ones as
    /// a `data:` URL of the given MIME type.
    ///
    /// # Examples
    ///
    /// ```
    /// use palaver::conversion::domain::Payload;
    ///
    /// let payload = Payload::Bytes(b"hi".to_vec());
    /// assert_eq!(payload.to_url("text/plain"), "data:text/plain;base64,aGk=");
    /// ```
    #[must_use]
    pub fn to_url(&self, mime_type: &str) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Base64(encoded) => format!("data:{mime_type};base64,{encoded}"),
            Self::Bytes(bytes) => format!("data:{mime_type};base64,{}", STANDARD.encode(bytes)),
        }
    }
}
