//! The Message sum type representing one turn in a transcript.
//!
//! A turn is either a single schema-conformant fragment or a composite of
//! same-author fragments. Call sites branch on the kind by matching.

use super::structured::{as_record, text_field};
use super::{Author, AuthorRole, Metadata, MultiPartMessage, SinglePartMessage};
use crate::message::error::MessageError;
use crate::schema::{AttributeValue, MULTIPART_TYPE, SchemaRegistry};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// A top-level transcript entry.
///
/// # Examples
///
/// ```
/// use palaver::message::domain::{Author, Message, SinglePartMessage};
/// use palaver::schema::SchemaRegistry;
/// use mockable::DefaultClock;
///
/// let clock = DefaultClock;
/// let registry = SchemaRegistry::builtin();
/// let part = SinglePartMessage::create_empty(&registry, Author::human("ada"), "text", &clock)
///     .expect("text is a built-in type");
///
/// let message = Message::from(part);
/// assert_eq!(message.message_type(), "text");
/// assert!(!message.is_multi_part());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A single fragment.
    SinglePart(SinglePartMessage),
    /// A composite of same-author fragments.
    MultiPart(MultiPartMessage),
}

impl Message {
    /// Returns the author.
    #[must_use]
    pub const fn author(&self) -> &Author {
        match self {
            Self::SinglePart(message) => message.author(),
            Self::MultiPart(message) => message.author(),
        }
    }

    /// Returns the author's role.
    #[must_use]
    pub const fn author_role(&self) -> AuthorRole {
        self.author().role()
    }

    /// Returns the message type; composites report `"multipart"`.
    #[must_use]
    pub fn message_type(&self) -> &str {
        match self {
            Self::SinglePart(message) => message.message_type(),
            Self::MultiPart(message) => message.message_type(),
        }
    }

    /// Returns `true` for composites.
    #[must_use]
    pub const fn is_multi_part(&self) -> bool {
        matches!(self, Self::MultiPart(_))
    }

    /// Returns the single part, if this is one.
    #[must_use]
    pub const fn as_single_part(&self) -> Option<&SinglePartMessage> {
        match self {
            Self::SinglePart(message) => Some(message),
            Self::MultiPart(_) => None,
        }
    }

    /// Returns the composite, if this is one.
    #[must_use]
    pub const fn as_multi_part(&self) -> Option<&MultiPartMessage> {
        match self {
            Self::MultiPart(message) => Some(message),
            Self::SinglePart(_) => None,
        }
    }

    /// Returns the single parts this turn consists of, in order.
    #[must_use]
    pub fn parts(&self) -> &[SinglePartMessage] {
        match self {
            Self::SinglePart(message) => std::slice::from_ref(message),
            Self::MultiPart(message) => message.parts(),
        }
    }

    /// Consumes the message, returning its single parts in order.
    ///
    /// A composite's own metadata is discarded; each part keeps its own.
    #[must_use]
    pub fn into_parts(self) -> Vec<SinglePartMessage> {
        match self {
            Self::SinglePart(message) => vec![message],
            Self::MultiPart(message) => message.into_parts(),
        }
    }

    /// Returns the metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        match self {
            Self::SinglePart(message) => message.metadata(),
            Self::MultiPart(message) => message.metadata(),
        }
    }

    /// Returns one metadata entry.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::MissingKey`] if the entry is absent.
    pub fn metadata_attribute(&self, key: &str) -> Result<&AttributeValue, MessageError> {
        match self {
            Self::SinglePart(message) => message.metadata_attribute(key),
            Self::MultiPart(message) => message.metadata_attribute(key),
        }
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::SinglePart(message) => message.created_at(),
            Self::MultiPart(message) => message.created_at(),
        }
    }

    /// Returns the timestamp of the last committed mutation.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        match self {
            Self::SinglePart(message) => message.updated_at(),
            Self::MultiPart(message) => message.updated_at(),
        }
    }

    /// Replaces the metadata.
    pub fn set_metadata(&mut self, metadata: Metadata, clock: &impl Clock) {
        match self {
            Self::SinglePart(message) => message.set_metadata(metadata, clock),
            Self::MultiPart(message) => message.set_metadata(metadata, clock),
        }
    }

    /// Inserts or replaces one metadata entry.
    pub fn set_metadata_attribute(
        &mut self,
        key: impl Into<String>,
        value: AttributeValue,
        clock: &impl Clock,
    ) {
        match self {
            Self::SinglePart(message) => message.set_metadata_attribute(key, value, clock),
            Self::MultiPart(message) => message.set_metadata_attribute(key, value, clock),
        }
    }

    /// Encodes the message as a nested key-value structure.
    #[must_use]
    pub fn to_structured(&self) -> AttributeValue {
        match self {
            Self::SinglePart(message) => message.to_structured(),
            Self::MultiPart(message) => message.to_structured(),
        }
    }

    /// Decodes either message kind, dispatching on the `message_type` field.
    ///
    /// # Errors
    ///
    /// Returns the decoding errors of [`SinglePartMessage::from_structured`]
    /// or [`MultiPartMessage::from_structured`].
    pub fn from_structured(
        structured: &AttributeValue,
        registry: &SchemaRegistry,
    ) -> Result<Self, MessageError> {
        let record = as_record(structured, "message")?;
        if text_field(record, "message_type")? == MULTIPART_TYPE {
            MultiPartMessage::from_structured(structured, registry).map(Self::MultiPart)
        } else {
            SinglePartMessage::from_structured(structured, registry).map(Self::SinglePart)
        }
    }
}

impl From<SinglePartMessage> for Message {
    fn from(message: SinglePartMessage) -> Self {
        Self::SinglePart(message)
    }
}

impl From<MultiPartMessage> for Message {
    fn from(message: MultiPartMessage) -> Self {
        Self::MultiPart(message)
    }
}
