//! Dynamically typed attribute values carried by message values and metadata.
//!
//! Values form a closed, serialisable tree. Binary payloads are kept as raw
//! octets in [`AttributeValue::Bytes`] and are never coerced into text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute map keyed by attribute name.
pub type ValueMap = BTreeMap<String, AttributeValue>;

/// A single dynamically typed value.
///
/// # Examples
///
/// ```
/// use palaver::schema::{AttributeValue, ValueKind};
///
/// let value = AttributeValue::from("hello");
/// assert_eq!(value.kind(), ValueKind::Text);
/// assert_eq!(value.as_text(), Some("hello"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeValue {
    /// The absence of a value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed 64-bit integer.
    Integer(i64),
    /// A 64-bit float.
    Float(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw octets.
    Bytes(Vec<u8>),
    /// An ordered sequence of values. Also used to carry tuples.
    List(Vec<Self>),
    /// A string-keyed map of values.
    Map(ValueMap),
}

/// The concrete kind of an [`AttributeValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// [`AttributeValue::Null`].
    Null,
    /// [`AttributeValue::Bool`].
    Bool,
    /// [`AttributeValue::Integer`].
    Integer,
    /// [`AttributeValue::Float`].
    Float,
    /// [`AttributeValue::Text`].
    Text,
    /// [`AttributeValue::Bytes`].
    Bytes,
    /// [`AttributeValue::List`].
    List,
    /// [`AttributeValue::Map`].
    Map,
}

impl ValueKind {
    /// Returns the lowercase name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::List => "list",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AttributeValue {
    /// Returns the concrete kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::Text(_) => ValueKind::Text,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::List(_) => ValueKind::List,
            Self::Map(_) => ValueKind::Map,
        }
    }

    /// Returns the text content if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the octets if this is a bytes value.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the integer if this is an integer value.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the elements if this is a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries if this is a map value.
    #[must_use]
    pub const fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Concatenates two sequence values of the same kind.
    ///
    /// Returns `None` unless both values are text or both are bytes.
    #[must_use]
    pub fn concat(&self, suffix: &Self) -> Option<Self> {
        match (self, suffix) {
            (Self::Text(head), Self::Text(tail)) => Some(Self::Text(format!("{head}{tail}"))),
            (Self::Bytes(head), Self::Bytes(tail)) => {
                let mut joined = Vec::with_capacity(head.len() + tail.len());
                joined.extend_from_slice(head);
                joined.extend_from_slice(tail);
                Some(Self::Bytes(joined))
            }
            _ => None,
        }
    }

    /// Locates the first NaN or infinite float nested inside this value.
    ///
    /// The returned path is `$` for the value itself, with `.key` and
    /// `[index]` segments appended for map entries and list elements.
    /// JSON has no encoding for such floats.
    #[must_use]
    pub fn non_finite_path(&self) -> Option<String> {
        self.non_finite_suffix().map(|suffix| format!("${suffix}"))
    }

    fn non_finite_suffix(&self) -> Option<String> {
        match self {
            Self::Float(number) if !number.is_finite() => Some(String::new()),
            Self::List(items) => items.iter().enumerate().find_map(|(index, item)| {
                item.non_finite_suffix().map(|rest| format!("[{index}]{rest}"))
            }),
            Self::Map(entries) => entries.iter().find_map(|(key, item)| {
                item.non_finite_suffix().map(|rest| format!(".{key}{rest}"))
            }),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for AttributeValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for AttributeValue {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<ValueMap> for AttributeValue {
    fn from(value: ValueMap) -> Self {
        Self::Map(value)
    }
}

impl From<Vec<Self>> for AttributeValue {
    fn from(value: Vec<Self>) -> Self {
        Self::List(value)
    }
}
