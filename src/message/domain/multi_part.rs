//! Composite messages: an ordered group of same-author single parts.

use super::envelope::Envelope;
use super::structured::{as_record, list_field, text_field};
use super::{Author, AuthorRole, Metadata, SinglePartMessage};
use crate::message::error::{CompositionError, MessageError};
use crate::schema::{AttributeValue, MULTIPART_TYPE, SchemaRegistry, ValueMap};
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::trace;

/// A turn made of several single-part messages from one author.
///
/// # Invariants
///
/// - `parts` is never empty
/// - every part shares the composite's author and role
/// - no part is itself a composite
///
/// # Examples
///
/// ```
/// use palaver::message::domain::{Author, MultiPartMessage};
/// use palaver::schema::{AttributeValue, SchemaRegistry, ValueMap};
/// use mockable::DefaultClock;
///
/// let clock = DefaultClock;
/// let registry = SchemaRegistry::builtin();
/// let author = Author::generative("bot");
/// let chunk = ValueMap::from([("text".to_owned(), AttributeValue::from("Hi"))]);
///
/// let mut message = MultiPartMessage::start(&registry, author, "text", chunk, &clock)
///     .expect("valid text chunk");
/// let image = ValueMap::from([(
///     "url".to_owned(),
///     AttributeValue::from("https://example.com/cat.png"),
/// )]);
/// message
///     .append_chunk(&registry, "image_url", image, &clock)
///     .expect("valid image chunk");
///
/// assert_eq!(message.part_types().collect::<Vec<_>>(), ["text", "image_url"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPartMessage {
    envelope: Envelope,
    parts: Vec<SinglePartMessage>,
}

impl MultiPartMessage {
    /// Creates a composite from existing parts.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidComposition`] if `parts` is empty or a
    /// part has a different author.
    pub fn create(
        author: Author,
        parts: Vec<SinglePartMessage>,
        clock: &impl Clock,
    ) -> Result<Self, MessageError> {
        if parts.is_empty() {
            return Err(CompositionError::EmptyParts.into());
        }
        check_authors(&author, &parts)?;
        Ok(Self {
            envelope: Envelope::new(author, Metadata::new(), clock),
            parts,
        })
    }

    /// Creates a composite whose first part is built from a full chunk.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidComposition`] for the composite type
    /// tag, and otherwise whatever [`SinglePartMessage::create`] returns.
    pub fn start(
        registry: &SchemaRegistry,
        author: Author,
        message_type: &str,
        chunk: ValueMap,
        clock: &impl Clock,
    ) -> Result<Self, MessageError> {
        reject_composite_type(message_type)?;
        let part =
            SinglePartMessage::create(registry, author.clone(), message_type, Some(chunk), clock)?;
        Self::create(author, vec![part], clock)
    }

    /// Sets the composite's own metadata, leaving timestamps untouched.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.envelope.replace_metadata(metadata);
        self
    }

    /// Returns the author shared by every part.
    #[must_use]
    pub const fn author(&self) -> &Author {
        self.envelope.author()
    }

    /// Returns the author's role.
    #[must_use]
    pub const fn author_role(&self) -> AuthorRole {
        self.envelope.author().role()
    }

    /// Returns the reserved composite type tag.
    #[must_use]
    pub const fn message_type(&self) -> &'static str {
        MULTIPART_TYPE
    }

    /// Returns the parts in order.
    #[must_use]
    pub fn parts(&self) -> &[SinglePartMessage] {
        &self.parts
    }

    /// Consumes the composite, returning its parts.
    #[must_use]
    pub fn into_parts(self) -> Vec<SinglePartMessage> {
        self.parts
    }

    /// Returns the part at `index`, if any.
    #[must_use]
    pub fn part(&self, index: usize) -> Option<&SinglePartMessage> {
        self.parts.get(index)
    }

    /// Returns the number of parts. Always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Always `false`; present for symmetry with [`Self::len`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns the message type of each part in order.
    pub fn part_types(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(SinglePartMessage::message_type)
    }

    /// Returns the metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        self.envelope.metadata()
    }

    /// Returns one metadata entry.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::MissingKey`] if the entry is absent.
    pub fn metadata_attribute(&self, key: &str) -> Result<&AttributeValue, MessageError> {
        self.envelope.metadata_attribute(key)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.envelope.created_at()
    }

    /// Returns the timestamp of the last committed mutation.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.envelope.updated_at()
    }

    /// Appends a part.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidComposition`] if the part's author
    /// differs from the composite's.
    pub fn append_part(
        &mut self,
        part: SinglePartMessage,
        clock: &impl Clock,
    ) -> Result<(), MessageError> {
        self.extend_parts(vec![part], clock)
    }

    /// Appends several parts, all or none.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidComposition`] if any part's author
    /// differs from the composite's.
    pub fn extend_parts(
        &mut self,
        parts: Vec<SinglePartMessage>,
        clock: &impl Clock,
    ) -> Result<(), MessageError> {
        check_authors(self.author(), &parts)?;
        if parts.is_empty() {
            return Ok(());
        }
        self.parts.extend(parts);
        self.envelope.touch(clock);
        Ok(())
    }

    /// Replaces the part at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidComposition`] if `index` is past the
    /// last part or the part's author differs from the composite's. The
    /// composite is unchanged on error.
    pub fn set_part(
        &mut self,
        index: usize,
        part: SinglePartMessage,
        clock: &impl Clock,
    ) -> Result<(), MessageError> {
        check_authors(self.author(), std::slice::from_ref(&part))?;
        let len = self.parts.len();
        let slot = self
            .parts
            .get_mut(index)
            .ok_or(CompositionError::PartIndexOutOfRange { index, len })?;
        *slot = part;
        self.envelope.touch(clock);
        Ok(())
    }

    /// Replaces every part.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidComposition`] if `parts` is empty or a
    /// part has a different author. The composite is unchanged on error.
    pub fn set_parts(
        &mut self,
        parts: Vec<SinglePartMessage>,
        clock: &impl Clock,
    ) -> Result<(), MessageError> {
        if parts.is_empty() {
            return Err(CompositionError::EmptyParts.into());
        }
        check_authors(self.author(), &parts)?;
        trace!(parts = parts.len(), "replacing composite parts");
        self.parts = parts;
        self.envelope.touch(clock);
        Ok(())
    }

    /// Applies a full chunk to the trailing part, or starts a new part.
    ///
    /// The chunk is concatenated onto the last part when its type matches
    /// `message_type`; otherwise a new part is built from the chunk.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidComposition`] for the composite type
    /// tag, and the underlying schema errors otherwise. A failed chunk
    /// leaves the composite unchanged.
    pub fn append_chunk(
        &mut self,
        registry: &SchemaRegistry,
        message_type: &str,
        chunk: ValueMap,
        clock: &impl Clock,
    ) -> Result<(), MessageError> {
        reject_composite_type(message_type)?;
        if let Some(last) = self.trailing_part_of_type(message_type) {
            last.append_chunk(&chunk, clock)?;
        } else {
            trace!(message_type, "starting new part from chunk");
            let part = SinglePartMessage::create(
                registry,
                self.author().clone(),
                message_type,
                Some(chunk),
                clock,
            )?;
            self.parts.push(part);
        }
        self.envelope.touch(clock);
        Ok(())
    }

    /// Applies a single-attribute chunk to the trailing part, or seeds a new
    /// empty part and applies it there.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidComposition`] for the composite type
    /// tag, and the underlying schema errors otherwise. A failed chunk
    /// leaves the composite unchanged.
    pub fn append_chunk_by_attribute(
        &mut self,
        registry: &SchemaRegistry,
        message_type: &str,
        key: &str,
        chunk: &AttributeValue,
        clock: &impl Clock,
    ) -> Result<(), MessageError> {
        reject_composite_type(message_type)?;
        if let Some(last) = self.trailing_part_of_type(message_type) {
            last.append_chunk_by_attribute(key, chunk, clock)?;
        } else {
            trace!(message_type, key, "seeding new part from attribute chunk");
            let mut part = SinglePartMessage::create_empty(
                registry,
                self.author().clone(),
                message_type,
                clock,
            )?;
            part.append_chunk_by_attribute(key, chunk, clock)?;
            self.parts.push(part);
        }
        self.envelope.touch(clock);
        Ok(())
    }

    /// Replaces the metadata.
    pub fn set_metadata(&mut self, metadata: Metadata, clock: &impl Clock) {
        self.envelope.set_metadata(metadata, clock);
    }

    /// Inserts or replaces one metadata entry.
    pub fn set_metadata_attribute(
        &mut self,
        key: impl Into<String>,
        value: AttributeValue,
        clock: &impl Clock,
    ) {
        self.envelope.set_metadata_attribute(key.into(), value, clock);
    }

    /// Encodes the composite and its parts as a nested key-value structure.
    #[must_use]
    pub fn to_structured(&self) -> AttributeValue {
        let mut record = ValueMap::new();
        self.envelope.write_structured(&mut record);
        record.insert("message_type".to_owned(), AttributeValue::from(MULTIPART_TYPE));
        record.insert(
            "parts".to_owned(),
            AttributeValue::List(
                self.parts
                    .iter()
                    .map(SinglePartMessage::to_structured)
                    .collect(),
            ),
        );
        AttributeValue::Map(record)
    }

    /// Decodes a composite produced by [`Self::to_structured`].
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::MalformedStructure`] for missing or mistyped
    /// fields, [`MessageError::InvalidComposition`] if the decoded parts
    /// break the composition rules, and any error from decoding a part.
    pub fn from_structured(
        structured: &AttributeValue,
        registry: &SchemaRegistry,
    ) -> Result<Self, MessageError> {
        let record = as_record(structured, "multi-part message")?;
        let message_type = text_field(record, "message_type")?;
        if message_type != MULTIPART_TYPE {
            return Err(MessageError::malformed(format!(
                "expected a composite, found message type '{message_type}'"
            )));
        }
        let envelope = Envelope::read_structured(record)?;
        let parts = list_field(record, "parts")?
            .iter()
            .map(|part| SinglePartMessage::from_structured(part, registry))
            .collect::<Result<Vec<_>, _>>()?;
        if parts.is_empty() {
            return Err(CompositionError::EmptyParts.into());
        }
        check_authors(envelope.author(), &parts)?;
        Ok(Self { envelope, parts })
    }

    fn trailing_part_of_type(&mut self, message_type: &str) -> Option<&mut SinglePartMessage> {
        self.parts
            .last_mut()
            .filter(|last| last.message_type() == message_type)
    }
}

pub(crate) fn check_authors(
    author: &Author,
    parts: &[SinglePartMessage],
) -> Result<(), CompositionError> {
    parts
        .iter()
        .find(|part| part.author() != author)
        .map_or(Ok(()), |stray| {
            Err(CompositionError::AuthorMismatch {
                expected: author.clone(),
                found: stray.author().clone(),
            })
        })
}

/// Rejects the composite type tag as a part type.
pub(crate) fn reject_composite_type(message_type: &str) -> Result<(), CompositionError> {
    if message_type == MULTIPART_TYPE {
        Err(CompositionError::NestedComposite(message_type.to_owned()))
    } else {
        Ok(())
    }
}
