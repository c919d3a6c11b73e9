//! Attachments supplied by the developer alongside the instructions.

use crate::message::domain::structured::{as_record, field, text_field};
use crate::message::error::MessageError;
use crate::schema::{AttributeValue, ValueMap};

/// A reference to supporting material, by location or inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeveloperAttachment {
    /// Material reachable at a URL.
    Url(String),
    /// Material carried inline as raw bytes.
    Inline(Vec<u8>),
}

impl DeveloperAttachment {
    /// Creates a URL attachment.
    #[must_use]
    pub fn url(location: impl Into<String>) -> Self {
        Self::Url(location.into())
    }

    /// Creates an inline attachment.
    #[must_use]
    pub fn inline(data: impl Into<Vec<u8>>) -> Self {
        Self::Inline(data.into())
    }

    pub(crate) fn to_structured(&self) -> AttributeValue {
        let record = match self {
            Self::Url(location) => ValueMap::from([
                ("kind".to_owned(), AttributeValue::from("url")),
                ("url".to_owned(), AttributeValue::from(location.as_str())),
            ]),
            Self::Inline(data) => ValueMap::from([
                ("kind".to_owned(), AttributeValue::from("inline")),
                ("data".to_owned(), AttributeValue::Bytes(data.clone())),
            ]),
        };
        AttributeValue::Map(record)
    }

    pub(crate) fn from_structured(structured: &AttributeValue) -> Result<Self, MessageError> {
        let record = as_record(structured, "developer attachment")?;
        match text_field(record, "kind")? {
            "url" => Ok(Self::Url(text_field(record, "url")?.to_owned())),
            "inline" => field(record, "data")?
                .as_bytes()
                .map(|data| Self::Inline(data.to_vec()))
                .ok_or_else(|| MessageError::malformed("field 'data' must be bytes")),
            other => Err(MessageError::malformed(format!(
                "unknown developer attachment kind '{other}'"
            ))),
        }
    }
}
