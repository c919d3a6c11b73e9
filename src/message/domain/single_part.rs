//! Single-part messages: one schema-conformant fragment from one author.

use super::envelope::Envelope;
use super::structured::{as_record, map_field, text_field};
use super::{Author, AuthorRole, Metadata};
use crate::message::error::MessageError;
use crate::schema::{
    AttributeValue, MULTIPART_TYPE, MessageSchema, SchemaRegistry, SchemaViolation, ValueMap,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;

/// One turn fragment whose value always satisfies its message type's schema.
///
/// # Invariants
///
/// - the value's key set equals the schema's required keys
/// - every attribute satisfies its declared descriptor
/// - `author`, `message_type` and `created_at` never change
/// - `updated_at` never decreases and only moves on committed mutations
///
/// # Examples
///
/// ```
/// use palaver::message::domain::{Author, SinglePartMessage};
/// use palaver::schema::{AttributeValue, SchemaRegistry};
/// use mockable::DefaultClock;
///
/// let clock = DefaultClock;
/// let registry = SchemaRegistry::builtin();
/// let mut message =
///     SinglePartMessage::create_empty(&registry, Author::generative("bot"), "text", &clock)
///         .expect("text is a built-in type");
///
/// message
///     .append_chunk_by_attribute("text", &AttributeValue::from("Hel"), &clock)
///     .expect("text accepts text chunks");
/// message
///     .append_chunk_by_attribute("text", &AttributeValue::from("lo"), &clock)
///     .expect("text accepts text chunks");
///
/// assert_eq!(message.attribute("text").ok(), Some(&AttributeValue::from("Hello")));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SinglePartMessage {
    envelope: Envelope,
    schema: Arc<MessageSchema>,
    value: ValueMap,
}

impl SinglePartMessage {
    /// Creates a message, validating `value` against the type's schema.
    ///
    /// When `value` is `None` the schema's empty value is used.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Schema`] for an unknown type and
    /// [`MessageError::SchemaMismatch`] listing every violated key.
    pub fn create(
        registry: &SchemaRegistry,
        author: Author,
        message_type: &str,
        value: Option<ValueMap>,
        clock: &impl Clock,
    ) -> Result<Self, MessageError> {
        SinglePartMessageBuilder {
            author,
            message_type: message_type.to_owned(),
            value,
            metadata: Metadata::new(),
        }
        .build(registry, clock)
    }

    /// Creates a message holding the schema's empty value.
    ///
    /// Useful as a seed for attribute-by-attribute construction.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Schema`] if the type is unknown.
    pub fn create_empty(
        registry: &SchemaRegistry,
        author: Author,
        message_type: &str,
        clock: &impl Clock,
    ) -> Result<Self, MessageError> {
        Self::builder(author, message_type).build(registry, clock)
    }

    /// Returns a builder for messages that also carry metadata.
    #[must_use]
    pub fn builder(author: Author, message_type: impl Into<String>) -> SinglePartMessageBuilder {
        SinglePartMessageBuilder::new(author, message_type)
    }

    /// Returns the author.
    #[must_use]
    pub const fn author(&self) -> &Author {
        self.envelope.author()
    }

    /// Returns the author's role.
    #[must_use]
    pub const fn author_role(&self) -> AuthorRole {
        self.envelope.author().role()
    }

    /// Returns the message type identifier.
    #[must_use]
    pub fn message_type(&self) -> &str {
        self.schema.type_id()
    }

    /// Returns the schema the value conforms to.
    #[must_use]
    pub const fn schema(&self) -> &Arc<MessageSchema> {
        &self.schema
    }

    /// Returns the full value.
    #[must_use]
    pub const fn value(&self) -> &ValueMap {
        &self.value
    }

    /// Returns one attribute of the value.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::MissingKey`] if the attribute is absent.
    pub fn attribute(&self, key: &str) -> Result<&AttributeValue, MessageError> {
        self.value
            .get(key)
            .ok_or_else(|| MessageError::MissingKey(key.to_owned()))
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

    /// Replaces the whole value.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::SchemaMismatch`] and leaves the message
    /// unchanged if the new value violates the schema.
    pub fn set_value(&mut self, value: ValueMap, clock: &impl Clock) -> Result<(), MessageError> {
        self.ensure_conforms(&value)?;
        self.value = value;
        self.envelope.touch(clock);
        Ok(())
    }

    /// Replaces a single attribute.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::SchemaMismatch`] if the key is not part of the
    /// schema or the value has the wrong shape.
    pub fn set_attribute(
        &mut self,
        key: &str,
        value: AttributeValue,
        clock: &impl Clock,
    ) -> Result<(), MessageError> {
        self.schema
            .check_attribute(key, &value)
            .map_err(|violation| self.mismatch(vec![violation]))?;
        self.value.insert(key.to_owned(), value);
        self.envelope.touch(clock);
        Ok(())
    }

    /// Concatenates a chunk onto every attribute.
    ///
    /// The chunk must carry exactly the schema's keys. Concatenation is only
    /// defined for text and bytes attributes.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::SchemaMismatch`] listing every offending key;
    /// nothing is written unless all attributes succeed.
    pub fn append_chunk(
        &mut self,
        chunk: &ValueMap,
        clock: &impl Clock,
    ) -> Result<(), MessageError> {
        let mut violations = self.schema.check_keys(chunk);
        let mut staged = self.value.clone();
        for (key, piece) in chunk {
            let Some(existing) = self.value.get(key) else {
                continue;
            };
            match self.schema.concat_attribute(key, existing, piece) {
                Ok(joined) => {
                    staged.insert(key.clone(), joined);
                }
                Err(violation) => violations.push(violation),
            }
        }
        if !violations.is_empty() {
            return Err(self.mismatch(violations));
        }
        self.value = staged;
        self.envelope.touch(clock);
        Ok(())
    }

    /// Concatenates a chunk onto a single attribute.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::SchemaMismatch`] if the key is unknown, the
    /// chunk has the wrong type, or the attribute is not text or bytes.
    pub fn append_chunk_by_attribute(
        &mut self,
        key: &str,
        chunk: &AttributeValue,
        clock: &impl Clock,
    ) -> Result<(), MessageError> {
        let existing = self
            .value
            .get(key)
            .ok_or_else(|| self.mismatch(vec![SchemaViolation::UnexpectedKey(key.to_owned())]))?;
        let joined = self
            .schema
            .concat_attribute(key, existing, chunk)
            .map_err(|violation| self.mismatch(vec![violation]))?;
        self.value.insert(key.to_owned(), joined);
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

    /// Encodes the message as a nested key-value structure.
    #[must_use]
    pub fn to_structured(&self) -> AttributeValue {
        let mut record = ValueMap::new();
        self.envelope.write_structured(&mut record);
        record.insert("message_type".to_owned(), AttributeValue::from(self.message_type()));
        record.insert("value".to_owned(), AttributeValue::Map(self.value.clone()));
        AttributeValue::Map(record)
    }

    /// Decodes a message produced by [`Self::to_structured`].
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::MalformedStructure`] for missing or mistyped
    /// fields, [`MessageError::Schema`] for an unknown type, and
    /// [`MessageError::SchemaMismatch`] if the stored value does not conform.
    pub fn from_structured(
        structured: &AttributeValue,
        registry: &SchemaRegistry,
    ) -> Result<Self, MessageError> {
        let record = as_record(structured, "single-part message")?;
        let message_type = text_field(record, "message_type")?;
        if message_type == MULTIPART_TYPE {
            return Err(MessageError::malformed(
                "expected a single-part message, found a composite",
            ));
        }
        let schema = Arc::clone(registry.lookup(message_type)?);
        let value = map_field(record, "value")?.clone();
        let violations = schema.check_value(&value);
        if !violations.is_empty() {
            return Err(MessageError::schema_mismatch(message_type, violations));
        }
        Ok(Self {
            envelope: Envelope::read_structured(record)?,
            schema,
            value,
        })
    }

    fn ensure_conforms(&self, value: &ValueMap) -> Result<(), MessageError> {
        let violations = self.schema.check_value(value);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(self.mismatch(violations))
        }
    }

    fn mismatch(&self, violations: Vec<SchemaViolation>) -> MessageError {
        MessageError::schema_mismatch(self.message_type(), violations)
    }
}

/// Builder for single-part messages with an explicit value and metadata.
///
/// # Examples
///
/// ```
/// use palaver::message::domain::{Author, Metadata, SinglePartMessage};
/// use palaver::schema::{AttributeValue, SchemaRegistry, ValueMap};
/// use mockable::DefaultClock;
///
/// let message = SinglePartMessage::builder(Author::human("ada"), "image_url")
///     .with_value(ValueMap::from([(
///         "url".to_owned(),
///         AttributeValue::from("https://example.com/cat.png"),
///     )]))
///     .with_metadata(Metadata::new().with("source", AttributeValue::from("upload")))
///     .build(&SchemaRegistry::builtin(), &DefaultClock)
///     .expect("valid image_url value");
///
/// assert_eq!(message.message_type(), "image_url");
/// ```
#[derive(Debug)]
pub struct SinglePartMessageBuilder {
    author: Author,
    message_type: String,
    value: Option<ValueMap>,
    metadata: Metadata,
}

impl SinglePartMessageBuilder {
    /// Creates a builder for the given author and message type.
    #[must_use]
    pub fn new(author: Author, message_type: impl Into<String>) -> Self {
        Self {
            author,
            message_type: message_type.into(),
            value: None,
            metadata: Metadata::new(),
        }
    }

    /// Sets the initial value. Without one the schema's empty value is used.
    #[must_use]
    pub fn with_value(mut self, value: ValueMap) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Validates and builds the message, stamping both timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Schema`] for an unknown type and
    /// [`MessageError::SchemaMismatch`] for a nonconforming value.
    pub fn build(
        self,
        registry: &SchemaRegistry,
        clock: &impl Clock,
    ) -> Result<SinglePartMessage, MessageError> {
        let schema = Arc::clone(registry.lookup(&self.message_type)?);
        let value = self
            .value
            .unwrap_or_else(|| schema.empty_value().clone());
        let violations = schema.check_value(&value);
        if !violations.is_empty() {
            return Err(MessageError::schema_mismatch(self.message_type, violations));
        }
        Ok(SinglePartMessage {
            envelope: Envelope::new(self.author, self.metadata, clock),
            schema,
            value,
        })
    }
}
