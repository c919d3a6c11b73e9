//! The Transcript aggregate and its merge state machine.
//!
//! The last top-level message is the focus: the only entry that can be
//! extended in place. An incoming fragment from the focus's author extends
//! it (or promotes it into a composite); anything else starts a new turn.

use super::DeveloperAttachment;
use crate::message::domain::structured::{
    as_record, encode_timestamp, list_field, map_field, text_field, timestamp_field,
};
use crate::message::domain::{
    Author, Message, Metadata, MultiPartMessage, SinglePartMessage, check_authors,
    reject_composite_type,
};
use crate::message::error::{CompositionError, MessageError};
use crate::schema::{AttributeValue, SchemaRegistry, ValueMap};
use crate::transcript::error::InvariantViolation;
use crate::transcript::validation::invariants;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, trace};

/// An ordered record of conversational turns.
///
/// # Invariants
///
/// - consecutive top-level messages never share an author
/// - `title` and `created_at` never change
/// - `updated_at` never decreases and moves on every committed mutation
///
/// # Examples
///
/// ```
/// use palaver::message::domain::Author;
/// use palaver::schema::{AttributeValue, ValueMap};
/// use palaver::transcript::domain::Transcript;
/// use mockable::DefaultClock;
///
/// let clock = DefaultClock;
/// let mut transcript = Transcript::new("support", &clock);
/// let bot = Author::generative("bot");
///
/// for token in ["Hel", "lo"] {
///     let chunk = ValueMap::from([("text".to_owned(), AttributeValue::from(token))]);
///     transcript
///         .append_message_chunk(bot.clone(), "text", chunk, &clock)
///         .expect("valid text chunk");
/// }
///
/// assert_eq!(transcript.len(), 1);
/// let focus = transcript.focus().and_then(|m| m.as_single_part()).expect("single part");
/// assert_eq!(focus.attribute("text").ok(), Some(&AttributeValue::from("Hello")));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    title: String,
    registry: Arc<SchemaRegistry>,
    messages: Vec<Message>,
    developer_instructions: String,
    developer_attachments: Vec<DeveloperAttachment>,
    metadata: Metadata,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// A chunk in either of its two granularities.
enum Chunk<'a> {
    Full(ValueMap),
    Attribute {
        key: &'a str,
        value: &'a AttributeValue,
    },
}

impl Chunk<'_> {
    fn seed(
        self,
        registry: &SchemaRegistry,
        author: Author,
        message_type: &str,
        clock: &impl Clock,
    ) -> Result<SinglePartMessage, MessageError> {
        match self {
            Self::Full(value) => {
                SinglePartMessage::create(registry, author, message_type, Some(value), clock)
            }
            Self::Attribute { key, value } => {
                let mut part =
                    SinglePartMessage::create_empty(registry, author, message_type, clock)?;
                part.append_chunk_by_attribute(key, value, clock)?;
                Ok(part)
            }
        }
    }

    fn apply_to_part(
        self,
        part: &mut SinglePartMessage,
        clock: &impl Clock,
    ) -> Result<(), MessageError> {
        match self {
            Self::Full(value) => part.append_chunk(&value, clock),
            Self::Attribute { key, value } => part.append_chunk_by_attribute(key, value, clock),
        }
    }

    fn apply_to_composite(
        self,
        composite: &mut MultiPartMessage,
        registry: &SchemaRegistry,
        message_type: &str,
        clock: &impl Clock,
    ) -> Result<(), MessageError> {
        match self {
            Self::Full(value) => composite.append_chunk(registry, message_type, value, clock),
            Self::Attribute { key, value } => {
                composite.append_chunk_by_attribute(registry, message_type, key, value, clock)
            }
        }
    }
}

impl Transcript {
    /// Creates an empty transcript resolving types against the built-in registry.
    #[must_use]
    pub fn new(title: impl Into<String>, clock: &impl Clock) -> Self {
        Self::with_registry(title, SchemaRegistry::builtin(), clock)
    }

    /// Creates an empty transcript resolving types against `registry`.
    #[must_use]
    pub fn with_registry(
        title: impl Into<String>,
        registry: Arc<SchemaRegistry>,
        clock: &impl Clock,
    ) -> Self {
        let now = clock.utc();
        Self {
            title: title.into(),
            registry,
            messages: Vec::new(),
            developer_instructions: String::new(),
            developer_attachments: Vec::new(),
            metadata: Metadata::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the registry message types are resolved against.
    #[must_use]
    pub const fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Returns the top-level messages in order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the last top-level message, if any.
    #[must_use]
    pub fn focus(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns the number of turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if there are no turns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the developer instructions.
    #[must_use]
    pub fn developer_instructions(&self) -> &str {
        &self.developer_instructions
    }

    /// Returns the developer attachments in order.
    #[must_use]
    pub fn developer_attachments(&self) -> &[DeveloperAttachment] {
        &self.developer_attachments
    }

    /// Returns the metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns one metadata entry.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::MissingKey`] if the entry is absent.
    pub fn metadata_attribute(&self, key: &str) -> Result<&AttributeValue, MessageError> {
        self.metadata
            .get(key)
            .ok_or_else(|| MessageError::MissingKey(key.to_owned()))
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the timestamp of the last committed mutation.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the distinct message types present, including composite parts.
    ///
    /// `"multipart"` is included when any turn is a composite.
    #[must_use]
    pub fn message_type_tags(&self) -> BTreeSet<String> {
        let mut tags = BTreeSet::new();
        for message in &self.messages {
            tags.insert(message.message_type().to_owned());
            if message.is_multi_part() {
                tags.extend(message.parts().iter().map(|part| part.message_type().to_owned()));
            }
        }
        tags
    }

    /// Reports every invariant the current messages break.
    ///
    /// The merge rules never produce a violation on their own. Messages
    /// built against another registry, or a decoded message list, can.
    #[must_use]
    pub fn audit(&self) -> Vec<InvariantViolation> {
        invariants::audit(&self.messages, &self.registry)
    }

    /// Appends a whole message.
    ///
    /// A message from the focus's author joins the focus: a single-part focus
    /// is promoted into a composite, and an incoming composite contributes
    /// its parts. Any other message starts a new turn.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidComposition`] if the merged composite
    /// would break its invariants. The transcript is unchanged on error.
    pub fn append_message(
        &mut self,
        message: impl Into<Message>,
        clock: &impl Clock,
    ) -> Result<(), MessageError> {
        let incoming = message.into();
        if let Some(focus) = self
            .messages
            .last_mut()
            .filter(|focus| focus.author() == incoming.author())
        {
            let parts = incoming.into_parts();
            match focus {
                Message::MultiPart(composite) => {
                    trace!(parts = parts.len(), "extending composite focus");
                    composite.extend_parts(parts, clock)?;
                }
                Message::SinglePart(single) => {
                    debug!(author = %single.author(), "promoting focus into a composite");
                    let mut combined = Vec::with_capacity(parts.len() + 1);
                    combined.push(single.clone());
                    combined.extend(parts);
                    let composite =
                        MultiPartMessage::create(single.author().clone(), combined, clock)?;
                    *focus = Message::MultiPart(composite);
                }
            }
        } else {
            debug!(author = %incoming.author(), "starting new turn");
            self.messages.push(incoming);
        }
        self.touch(clock);
        Ok(())
    }

    /// Replaces the part at `index` within the focus.
    ///
    /// A single-part focus has exactly one part, at index zero.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidComposition`] when the transcript is
    /// empty, `index` is out of range, or the part's author differs from
    /// the focus's. The transcript is unchanged on error.
    pub fn set_focus_part(
        &mut self,
        index: usize,
        part: SinglePartMessage,
        clock: &impl Clock,
    ) -> Result<(), MessageError> {
        let focus = self.messages.last_mut().ok_or(CompositionError::NoFocus)?;
        match focus {
            Message::MultiPart(composite) => composite.set_part(index, part, clock)?,
            Message::SinglePart(single) => {
                if index != 0 {
                    return Err(CompositionError::PartIndexOutOfRange { index, len: 1 }.into());
                }
                check_authors(single.author(), std::slice::from_ref(&part))?;
                *single = part;
            }
        }
        trace!(index, "replaced focus part");
        self.touch(clock);
        Ok(())
    }

    /// Replaces every part of the focus.
    ///
    /// A single-part focus given several parts is promoted into a
    /// composite; a composite focus keeps its envelope.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidComposition`] when the transcript is
    /// empty, `parts` is empty, or a part's author differs from the
    /// focus's. The transcript is unchanged on error.
    pub fn set_focus_parts(
        &mut self,
        parts: Vec<SinglePartMessage>,
        clock: &impl Clock,
    ) -> Result<(), MessageError> {
        let focus = self.messages.last_mut().ok_or(CompositionError::NoFocus)?;
        match focus {
            Message::MultiPart(composite) => composite.set_parts(parts, clock)?,
            Message::SinglePart(single) => {
                let author = single.author().clone();
                check_authors(&author, &parts)?;
                *focus = match <[SinglePartMessage; 1]>::try_from(parts) {
                    Ok([only]) => Message::SinglePart(only),
                    Err(several) => {
                        Message::MultiPart(MultiPartMessage::create(author, several, clock)?)
                    }
                };
            }
        }
        self.touch(clock);
        Ok(())
    }

    /// Appends a chunk carrying every attribute of `message_type`.
    ///
    /// The chunk extends the focus when the author and type match, joins
    /// the focus as a new part when only the author matches, and otherwise
    /// starts a new turn.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidComposition`] for the composite type
    /// tag, and schema errors for unknown types or nonconforming chunks. The
    /// transcript is unchanged on error.
    pub fn append_message_chunk(
        &mut self,
        author: Author,
        message_type: &str,
        chunk: ValueMap,
        clock: &impl Clock,
    ) -> Result<(), MessageError> {
        self.apply_chunk(author, message_type, Chunk::Full(chunk), clock)
    }

    /// Appends a chunk for a single attribute of `message_type`.
    ///
    /// Follows the same rule as [`Self::append_message_chunk`]; new messages
    /// are seeded from the schema's empty value.
    ///
    /// # Errors
    ///
    /// As for [`Self::append_message_chunk`].
    pub fn append_message_chunk_by_attribute(
        &mut self,
        author: Author,
        message_type: &str,
        key: &str,
        chunk: &AttributeValue,
        clock: &impl Clock,
    ) -> Result<(), MessageError> {
        self.apply_chunk(
            author,
            message_type,
            Chunk::Attribute { key, value: chunk },
            clock,
        )
    }

    /// Replaces the developer instructions.
    pub fn set_developer_instructions(
        &mut self,
        instructions: impl Into<String>,
        clock: &impl Clock,
    ) {
        self.developer_instructions = instructions.into();
        self.touch(clock);
    }

    /// Replaces the developer attachments.
    pub fn set_developer_attachments(
        &mut self,
        attachments: Vec<DeveloperAttachment>,
        clock: &impl Clock,
    ) {
        self.developer_attachments = attachments;
        self.touch(clock);
    }

    /// Appends one developer attachment.
    pub fn append_developer_attachment(
        &mut self,
        attachment: DeveloperAttachment,
        clock: &impl Clock,
    ) {
        self.developer_attachments.push(attachment);
        self.touch(clock);
    }

    /// Replaces the metadata.
    pub fn set_metadata(&mut self, metadata: Metadata, clock: &impl Clock) {
        self.metadata = metadata;
        self.touch(clock);
    }

    /// Inserts or replaces one metadata entry.
    pub fn set_metadata_attribute(
        &mut self,
        key: impl Into<String>,
        value: AttributeValue,
        clock: &impl Clock,
    ) {
        self.metadata.insert(key, value);
        self.touch(clock);
    }

    /// Encodes the transcript and every message as a nested key-value structure.
    #[must_use]
    pub fn to_structured(&self) -> AttributeValue {
        let record = ValueMap::from([
            ("title".to_owned(), AttributeValue::from(self.title.as_str())),
            (
                "messages".to_owned(),
                AttributeValue::List(self.messages.iter().map(Message::to_structured).collect()),
            ),
            (
                "developer_instructions".to_owned(),
                AttributeValue::from(self.developer_instructions.as_str()),
            ),
            (
                "developer_attachments".to_owned(),
                AttributeValue::List(
                    self.developer_attachments
                        .iter()
                        .map(DeveloperAttachment::to_structured)
                        .collect(),
                ),
            ),
            (
                "metadata".to_owned(),
                AttributeValue::Map(self.metadata.entries().clone()),
            ),
            ("created_at".to_owned(), encode_timestamp(self.created_at)),
            ("updated_at".to_owned(), encode_timestamp(self.updated_at)),
        ]);
        AttributeValue::Map(record)
    }

    /// Decodes a transcript produced by [`Self::to_structured`].
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::MalformedStructure`] for missing or mistyped
    /// fields, for a message list that breaks an invariant reported by
    /// [`Self::audit`], and any error raised while decoding a message.
    pub fn from_structured(
        structured: &AttributeValue,
        registry: Arc<SchemaRegistry>,
    ) -> Result<Self, MessageError> {
        let record = as_record(structured, "transcript")?;
        let messages = list_field(record, "messages")?
            .iter()
            .map(|message| Message::from_structured(message, &registry))
            .collect::<Result<Vec<_>, _>>()?;
        let developer_attachments = list_field(record, "developer_attachments")?
            .iter()
            .map(DeveloperAttachment::from_structured)
            .collect::<Result<Vec<_>, _>>()?;
        let created_at = timestamp_field(record, "created_at")?;
        let updated_at = timestamp_field(record, "updated_at")?;
        if updated_at < created_at {
            return Err(MessageError::malformed("updated_at precedes created_at"));
        }
        let transcript = Self {
            title: text_field(record, "title")?.to_owned(),
            registry,
            messages,
            developer_instructions: text_field(record, "developer_instructions")?.to_owned(),
            developer_attachments,
            metadata: Metadata::from(map_field(record, "metadata")?.clone()),
            created_at,
            updated_at,
        };
        let violations = transcript.audit();
        if !violations.is_empty() {
            let reasons: Vec<String> = violations.iter().map(ToString::to_string).collect();
            return Err(MessageError::malformed(reasons.join("; ")));
        }
        Ok(transcript)
    }

    /// Renders the structured form as JSON.
    ///
    /// Bytes are written as integer arrays, so binary payloads survive the
    /// round trip unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::MalformedStructure`] if any float in the
    /// transcript is NaN or infinite, or if serialisation fails.
    pub fn to_json(&self) -> Result<String, MessageError> {
        let structured = self.to_structured();
        if let Some(path) = structured.non_finite_path() {
            return Err(MessageError::malformed(format!("non-finite float at {path}")));
        }
        serde_json::to_string(&structured)
            .map_err(|err| MessageError::malformed(format!("cannot encode transcript: {err}")))
    }

    /// Parses a transcript from JSON produced by [`Self::to_json`].
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::MalformedStructure`] for invalid JSON and the
    /// errors of [`Self::from_structured`] otherwise.
    pub fn from_json(document: &str, registry: Arc<SchemaRegistry>) -> Result<Self, MessageError> {
        let structured: AttributeValue = serde_json::from_str(document)
            .map_err(|err| MessageError::malformed(format!("invalid transcript JSON: {err}")))?;
        Self::from_structured(&structured, registry)
    }

    fn apply_chunk(
        &mut self,
        author: Author,
        message_type: &str,
        chunk: Chunk<'_>,
        clock: &impl Clock,
    ) -> Result<(), MessageError> {
        reject_composite_type(message_type)?;
        let registry = self.registry.as_ref();
        if let Some(focus) = self
            .messages
            .last_mut()
            .filter(|focus| focus.author() == &author)
        {
            match focus {
                Message::SinglePart(single) if single.message_type() == message_type => {
                    trace!(message_type, "extending focus");
                    chunk.apply_to_part(single, clock)?;
                }
                Message::SinglePart(single) => {
                    debug!(
                        from = single.message_type(),
                        to = message_type,
                        "promoting focus into a composite"
                    );
                    let part = chunk.seed(registry, author.clone(), message_type, clock)?;
                    let composite =
                        MultiPartMessage::create(author, vec![single.clone(), part], clock)?;
                    *focus = Message::MultiPart(composite);
                }
                Message::MultiPart(composite) => {
                    trace!(message_type, "dispatching chunk into composite focus");
                    chunk.apply_to_composite(composite, registry, message_type, clock)?;
                }
            }
        } else {
            debug!(%author, message_type, "starting new turn from chunk");
            let part = chunk.seed(registry, author, message_type, clock)?;
            self.messages.push(Message::SinglePart(part));
        }
        self.touch(clock);
        Ok(())
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = self.updated_at.max(clock.utc());
    }
}
