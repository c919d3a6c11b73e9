//! Structural type descriptors for message value attributes.
//!
//! A descriptor is plain data: registries can be loaded from JSON and the
//! validator interprets the tree directly.

use super::value::{AttributeValue, ValueKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar kinds a [`TypeDescriptor::Primitive`] can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    /// Matches [`AttributeValue::Null`].
    Null,
    /// Matches [`AttributeValue::Bool`].
    Bool,
    /// Matches [`AttributeValue::Integer`].
    Integer,
    /// Matches [`AttributeValue::Float`].
    Float,
    /// Matches [`AttributeValue::Text`].
    Text,
    /// Matches [`AttributeValue::Bytes`].
    Bytes,
}

impl PrimitiveKind {
    /// Returns `true` if the value has exactly this kind.
    #[must_use]
    pub const fn matches(self, value: &AttributeValue) -> bool {
        matches!(
            (self, value.kind()),
            (Self::Null, ValueKind::Null)
                | (Self::Bool, ValueKind::Bool)
                | (Self::Integer, ValueKind::Integer)
                | (Self::Float, ValueKind::Float)
                | (Self::Text, ValueKind::Text)
                | (Self::Bytes, ValueKind::Bytes)
        )
    }

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
        }
    }
}

/// The expected shape of an attribute value.
///
/// # Examples
///
/// ```
/// use palaver::schema::{PrimitiveKind, TypeDescriptor};
///
/// let descriptor = TypeDescriptor::list(TypeDescriptor::Primitive(PrimitiveKind::Text));
/// assert_eq!(descriptor.to_string(), "list<text>");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDescriptor {
    /// A scalar of one concrete kind.
    Primitive(PrimitiveKind),
    /// Any one of the alternatives.
    Sum(Vec<Self>),
    /// Exactly one of the listed values.
    Literal(Vec<AttributeValue>),
    /// A homogeneous list.
    List(Box<Self>),
    /// A map whose keys and values match the given descriptors.
    Map {
        /// Descriptor applied to every key (as a text value).
        key: Box<Self>,
        /// Descriptor applied to every value.
        value: Box<Self>,
    },
    /// A positional tuple, carried as a list value.
    Tuple {
        /// Element descriptors. A variadic tuple lists exactly one.
        elements: Vec<Self>,
        /// Whether every element repeats a single descriptor.
        #[serde(default)]
        variadic: bool,
    },
}

impl TypeDescriptor {
    /// Shorthand for a text primitive.
    #[must_use]
    pub const fn text() -> Self {
        Self::Primitive(PrimitiveKind::Text)
    }

    /// Shorthand for a bytes primitive.
    #[must_use]
    pub const fn bytes() -> Self {
        Self::Primitive(PrimitiveKind::Bytes)
    }

    /// Builds a homogeneous list descriptor.
    #[must_use]
    pub fn list(element: Self) -> Self {
        Self::List(Box::new(element))
    }

    /// Builds a keyed map descriptor.
    #[must_use]
    pub fn map(key: Self, value: Self) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Builds a fixed-length tuple descriptor.
    #[must_use]
    pub const fn tuple(elements: Vec<Self>) -> Self {
        Self::Tuple {
            elements,
            variadic: false,
        }
    }

    /// Builds a variadic tuple descriptor repeating `element`.
    #[must_use]
    pub fn variadic_tuple(element: Self) -> Self {
        Self::Tuple {
            elements: vec![element],
            variadic: true,
        }
    }

    /// Returns `true` if chunk concatenation is defined for this descriptor.
    ///
    /// Only text, bytes, and sums made solely of those qualify.
    #[must_use]
    pub fn is_concatenable(&self) -> bool {
        match self {
            Self::Primitive(kind) => matches!(kind, PrimitiveKind::Text | PrimitiveKind::Bytes),
            Self::Sum(alternatives) => {
                !alternatives.is_empty() && alternatives.iter().all(Self::is_concatenable)
            }
            Self::Literal(_) | Self::List(_) | Self::Map { .. } | Self::Tuple { .. } => false,
        }
    }

    /// Finds a nested variadic tuple that lists more than one element
    /// descriptor. Such a tuple has no unambiguous element type.
    #[must_use]
    pub fn overloaded_variadic(&self) -> Option<&Self> {
        match self {
            Self::Tuple {
                elements,
                variadic: true,
            } if elements.len() > 1 => Some(self),
            Self::Primitive(_) | Self::Literal(_) => None,
            Self::Sum(children) | Self::Tuple {
                elements: children, ..
            } => children.iter().find_map(Self::overloaded_variadic),
            Self::List(element) => element.overloaded_variadic(),
            Self::Map { key, value } => key
                .overloaded_variadic()
                .or_else(|| value.overloaded_variadic()),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => f.write_str(kind.as_str()),
            Self::Sum(alternatives) => write_joined(f, alternatives, " | "),
            Self::Literal(values) => {
                f.write_str("literal[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write_literal(f, value)?;
                }
                f.write_str("]")
            }
            Self::List(element) => write!(f, "list<{element}>"),
            Self::Map { key, value } => write!(f, "map<{key}, {value}>"),
            Self::Tuple { elements, variadic } => {
                f.write_str("tuple<")?;
                write_joined(f, elements, ", ")?;
                if *variadic {
                    f.write_str(", ...")?;
                }
                f.write_str(">")
            }
        }
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    descriptors: &[TypeDescriptor],
    separator: &str,
) -> fmt::Result {
    for (index, descriptor) in descriptors.iter().enumerate() {
        if index > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{descriptor}")?;
    }
    Ok(())
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &AttributeValue) -> fmt::Result {
    match value {
        AttributeValue::Text(text) => write!(f, "{text:?}"),
        AttributeValue::Integer(number) => write!(f, "{number}"),
        AttributeValue::Float(number) => write!(f, "{number}"),
        AttributeValue::Bool(flag) => write!(f, "{flag}"),
        other => f.write_str(other.kind().as_str()),
    }
}
