//! Fields shared by every message kind.

use super::structured::{encode_timestamp, map_field, text_field, timestamp_field};
use super::{Author, AuthorRole, Metadata};
use crate::message::error::MessageError;
use crate::schema::{AttributeValue, ValueMap};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// Provenance and bookkeeping common to single-part and composite messages.
///
/// `author` and `created_at` never change after construction; `updated_at`
/// only moves forward.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Envelope {
    author: Author,
    metadata: Metadata,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Envelope {
    pub(crate) fn new(author: Author, metadata: Metadata, clock: &impl Clock) -> Self {
        let now = clock.utc();
        Self {
            author,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) const fn author(&self) -> &Author {
        &self.author
    }

    pub(crate) const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub(crate) const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub(crate) fn metadata_attribute(&self, key: &str) -> Result<&AttributeValue, MessageError> {
        self.metadata
            .get(key)
            .ok_or_else(|| MessageError::MissingKey(key.to_owned()))
    }

    pub(crate) fn set_metadata(&mut self, metadata: Metadata, clock: &impl Clock) {
        self.metadata = metadata;
        self.touch(clock);
    }

    pub(crate) fn set_metadata_attribute(
        &mut self,
        key: String,
        value: AttributeValue,
        clock: &impl Clock,
    ) {
        self.metadata.insert(key, value);
        self.touch(clock);
    }

    pub(crate) fn replace_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
    }

    /// Advances `updated_at` to the clock's time, never moving it backwards.
    pub(crate) fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = self.updated_at.max(clock.utc());
    }

    pub(crate) fn write_structured(&self, record: &mut ValueMap) {
        record.insert("author".to_owned(), AttributeValue::from(self.author.name()));
        record.insert("author_role".to_owned(), AttributeValue::from(self.author.role().as_str()));
        record.insert("metadata".to_owned(), AttributeValue::Map(self.metadata.entries().clone()));
        record.insert("created_at".to_owned(), encode_timestamp(self.created_at));
        record.insert("updated_at".to_owned(), encode_timestamp(self.updated_at));
    }

    pub(crate) fn read_structured(record: &ValueMap) -> Result<Self, MessageError> {
        let name = text_field(record, "author")?;
        let role = AuthorRole::try_from(text_field(record, "author_role")?)
            .map_err(|err| MessageError::malformed(err.to_string()))?;
        let metadata = Metadata::from(map_field(record, "metadata")?.clone());
        let created_at = timestamp_field(record, "created_at")?;
        let updated_at = timestamp_field(record, "updated_at")?;
        if updated_at < created_at {
            return Err(MessageError::malformed("updated_at precedes created_at"));
        }
        Ok(Self {
            author: Author::new(name, role),
            metadata,
            created_at,
            updated_at,
        })
    }
}
