//! Open-ended metadata attached to messages and transcripts.

use crate::schema::{AttributeValue, ValueMap};

/// Free-form metadata keyed by string.
///
/// Unlike message values, metadata is not schema-checked.
///
/// # Examples
///
/// ```
/// use palaver::message::domain::Metadata;
/// use palaver::schema::AttributeValue;
///
/// let metadata = Metadata::new()
///     .with("model", AttributeValue::from("gpt-4o"))
///     .with("temperature", AttributeValue::Float(0.2));
/// assert_eq!(metadata.get("model"), Some(&AttributeValue::from("gpt-4o")));
/// assert_eq!(metadata.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    entries: ValueMap,
}

impl Metadata {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, returning the updated metadata.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.entries.insert(key.into(), value);
        self
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries.get(key)
    }

    /// Inserts or replaces an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.entries.insert(key.into(), value);
    }

    /// Returns the entries in key order.
    #[must_use]
    pub const fn entries(&self) -> &ValueMap {
        &self.entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<ValueMap> for Metadata {
    fn from(entries: ValueMap) -> Self {
        Self { entries }
    }
}

impl From<Metadata> for AttributeValue {
    fn from(metadata: Metadata) -> Self {
        Self::Map(metadata.entries)
    }
}
