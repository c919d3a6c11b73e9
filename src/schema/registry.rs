//! Message schemas and the read-only registry that catalogues them.
//!
//! A schema fixes the exact attribute key set of a message type, the
//! descriptor each attribute must satisfy, and the empty value used to seed
//! progressive construction. Registries are immutable once built; the
//! built-in catalogue is initialised once per process and shared.

use super::descriptor::{PrimitiveKind, TypeDescriptor};
use super::error::SchemaError;
use super::validator::{TypeMismatch, validate};
use super::value::{AttributeValue, ValueMap};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Type tag reserved for composite messages. No schema may claim it.
pub const MULTIPART_TYPE: &str = "multipart";

static BUILTIN: Lazy<Arc<SchemaRegistry>> = Lazy::new(|| {
    let schemas = builtin_schemas();
    Arc::new(SchemaRegistry {
        schemas: schemas
            .into_iter()
            .map(|schema| (schema.type_id.clone(), Arc::new(schema)))
            .collect(),
    })
});

/// Serialised form of a [`MessageSchema`], as found in registry documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Message type identifier, e.g. `text`.
    pub type_id: String,
    /// Exact key set every value must have.
    pub required_keys: BTreeSet<String>,
    /// Descriptor for each required key.
    pub attribute_types: BTreeMap<String, TypeDescriptor>,
    /// Default value satisfying the schema.
    pub empty_value: ValueMap,
}

/// The required shape of a message type's value.
///
/// # Examples
///
/// ```
/// use palaver::schema::SchemaRegistry;
///
/// let registry = SchemaRegistry::builtin();
/// let schema = registry.lookup("text").expect("text is built in");
/// assert!(schema.required_keys().contains("text"));
/// assert!(schema.check_value(schema.empty_value()).is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaDefinition", into = "SchemaDefinition")]
pub struct MessageSchema {
    type_id: String,
    required_keys: BTreeSet<String>,
    attribute_types: BTreeMap<String, TypeDescriptor>,
    empty_value: ValueMap,
}

impl MessageSchema {
    /// Creates a schema whose required keys are the descriptor keys.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ReservedTypeId`] for the composite tag and
    /// [`SchemaError::InvalidDefinition`] when the type id is blank or the
    /// empty value does not satisfy the descriptors.
    pub fn new(
        type_id: impl Into<String>,
        attribute_types: BTreeMap<String, TypeDescriptor>,
        empty_value: ValueMap,
    ) -> Result<Self, SchemaError> {
        let required_keys = attribute_types.keys().cloned().collect();
        Self::try_from(SchemaDefinition {
            type_id: type_id.into(),
            required_keys,
            attribute_types,
            empty_value,
        })
    }

    /// Returns the message type identifier.
    #[must_use]
    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    /// Returns the exact key set a value must carry.
    #[must_use]
    pub const fn required_keys(&self) -> &BTreeSet<String> {
        &self.required_keys
    }

    /// Returns the descriptor for an attribute, if the key is part of the schema.
    #[must_use]
    pub fn attribute_type(&self, key: &str) -> Option<&TypeDescriptor> {
        self.attribute_types.get(key)
    }

    /// Returns every attribute descriptor keyed by attribute name.
    #[must_use]
    pub const fn attribute_types(&self) -> &BTreeMap<String, TypeDescriptor> {
        &self.attribute_types
    }

    /// Returns the default value used for empty messages.
    #[must_use]
    pub const fn empty_value(&self) -> &ValueMap {
        &self.empty_value
    }

    /// Checks that `value` carries exactly the required keys.
    #[must_use]
    pub fn check_keys(&self, value: &ValueMap) -> Vec<SchemaViolation> {
        let missing = self
            .required_keys
            .iter()
            .filter(|key| !value.contains_key(key.as_str()))
            .map(|key| SchemaViolation::MissingKey(key.clone()));
        let unexpected = value
            .keys()
            .filter(|key| !self.required_keys.contains(key.as_str()))
            .map(|key| SchemaViolation::UnexpectedKey(key.clone()));
        missing.chain(unexpected).collect()
    }

    /// Checks the full value: exact key set plus every attribute's type.
    ///
    /// Returns every violation found; an empty vector means the value conforms.
    #[must_use]
    pub fn check_value(&self, value: &ValueMap) -> Vec<SchemaViolation> {
        let mut violations = self.check_keys(value);
        for (key, attribute) in value {
            if let Some(descriptor) = self.attribute_types.get(key)
                && let Err(mismatch) = validate(attribute, descriptor)
            {
                violations.push(SchemaViolation::type_mismatch(key, mismatch));
            }
        }
        violations
    }

    /// Checks a single attribute against its declared descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaViolation::UnexpectedKey`] if the key is not part of
    /// the schema, or [`SchemaViolation::TypeMismatch`] if the value does not
    /// satisfy the descriptor.
    pub fn check_attribute(
        &self,
        key: &str,
        value: &AttributeValue,
    ) -> Result<(), SchemaViolation> {
        let descriptor = self
            .attribute_types
            .get(key)
            .ok_or_else(|| SchemaViolation::UnexpectedKey(key.to_owned()))?;
        validate(value, descriptor)
            .map_err(|mismatch| SchemaViolation::type_mismatch(key, mismatch))
    }

    /// Concatenates `chunk` onto `existing` for the attribute `key`.
    ///
    /// # Errors
    ///
    /// Returns a violation if the chunk fails type validation, if the
    /// declared type is not text or bytes, or if the two values differ in kind.
    pub fn concat_attribute(
        &self,
        key: &str,
        existing: &AttributeValue,
        chunk: &AttributeValue,
    ) -> Result<AttributeValue, SchemaViolation> {
        self.check_attribute(key, chunk)?;
        let descriptor = self
            .attribute_types
            .get(key)
            .ok_or_else(|| SchemaViolation::UnexpectedKey(key.to_owned()))?;
        if !descriptor.is_concatenable() {
            return Err(SchemaViolation::not_concatenable(key, descriptor));
        }
        let joined = existing
            .concat(chunk)
            .ok_or_else(|| SchemaViolation::not_concatenable(key, descriptor))?;
        self.check_attribute(key, &joined)?;
        Ok(joined)
    }
}

impl TryFrom<SchemaDefinition> for MessageSchema {
    type Error = SchemaError;

    fn try_from(definition: SchemaDefinition) -> Result<Self, Self::Error> {
        let SchemaDefinition {
            type_id,
            required_keys,
            attribute_types,
            empty_value,
        } = definition;

        if type_id == MULTIPART_TYPE {
            return Err(SchemaError::ReservedTypeId(type_id));
        }
        if type_id.trim().is_empty() {
            return Err(SchemaError::invalid_definition(type_id, "type id must not be blank"));
        }
        let described: BTreeSet<&String> = attribute_types.keys().collect();
        let declared: BTreeSet<&String> = required_keys.iter().collect();
        if described != declared {
            return Err(SchemaError::invalid_definition(
                type_id,
                "attribute types must describe exactly the required keys",
            ));
        }
        let overloaded = attribute_types.iter().find_map(|(key, descriptor)| {
            descriptor.overloaded_variadic().map(|tuple| (key, tuple))
        });
        if let Some((key, tuple)) = overloaded {
            let reason =
                format!("attribute '{key}': variadic {tuple} must repeat exactly one element type");
            return Err(SchemaError::invalid_definition(type_id, reason));
        }

        let schema = Self {
            type_id,
            required_keys,
            attribute_types,
            empty_value,
        };
        let violations = schema.check_value(&schema.empty_value);
        if !violations.is_empty() {
            let reason = format!(
                "empty value does not satisfy the schema: {}",
                join_violations(&violations)
            );
            return Err(SchemaError::invalid_definition(schema.type_id, reason));
        }
        Ok(schema)
    }
}

impl From<MessageSchema> for SchemaDefinition {
    fn from(schema: MessageSchema) -> Self {
        Self {
            type_id: schema.type_id,
            required_keys: schema.required_keys,
            attribute_types: schema.attribute_types,
            empty_value: schema.empty_value,
        }
    }
}

/// One way in which a value fails its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    /// A required key is absent.
    MissingKey(String),
    /// A key outside the schema is present.
    UnexpectedKey(String),
    /// An attribute does not satisfy its descriptor.
    TypeMismatch {
        /// The offending attribute.
        key: String,
        /// Where and how validation failed.
        mismatch: TypeMismatch,
    },
    /// Chunk concatenation is undefined for the attribute.
    NotConcatenable {
        /// The offending attribute.
        key: String,
        /// The attribute's declared shape.
        declared: String,
    },
}

impl SchemaViolation {
    fn type_mismatch(key: &str, mismatch: TypeMismatch) -> Self {
        Self::TypeMismatch {
            key: key.to_owned(),
            mismatch,
        }
    }

    fn not_concatenable(key: &str, declared: &TypeDescriptor) -> Self {
        Self::NotConcatenable {
            key: key.to_owned(),
            declared: declared.to_string(),
        }
    }

    /// Returns the attribute key the violation concerns.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::MissingKey(key)
            | Self::UnexpectedKey(key)
            | Self::TypeMismatch { key, .. }
            | Self::NotConcatenable { key, .. } => key,
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey(key) => write!(f, "missing key '{key}'"),
            Self::UnexpectedKey(key) => write!(f, "unexpected key '{key}'"),
            Self::TypeMismatch { key, mismatch } => write!(f, "key '{key}' {mismatch}"),
            Self::NotConcatenable { key, declared } => {
                write!(f, "key '{key}' of type {declared} cannot be appended to")
            }
        }
    }
}

/// Joins violations into a single `; `-separated description.
#[must_use]
pub fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Read-only catalogue of message schemas keyed by type identifier.
///
/// # Examples
///
/// ```
/// use palaver::schema::{SchemaError, SchemaRegistry};
///
/// let registry = SchemaRegistry::builtin();
/// assert!(registry.contains("image_url"));
/// assert!(matches!(
///     registry.lookup("hologram"),
///     Err(SchemaError::UnknownType(_))
/// ));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Arc<MessageSchema>>,
}

impl SchemaRegistry {
    /// Returns the shared built-in registry.
    #[must_use]
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Builds a registry from the given schemas.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateTypeId`] if two schemas share a type id.
    pub fn from_schemas(
        schemas: impl IntoIterator<Item = MessageSchema>,
    ) -> Result<Self, SchemaError> {
        let mut catalogue = BTreeMap::new();
        for schema in schemas {
            let type_id = schema.type_id.clone();
            if catalogue
                .insert(type_id.clone(), Arc::new(schema))
                .is_some()
            {
                return Err(SchemaError::DuplicateTypeId(type_id));
            }
        }
        Ok(Self { schemas: catalogue })
    }

    /// Loads a registry from a JSON array of schema definitions.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Load`] if the document is malformed or any
    /// definition is invalid, and [`SchemaError::DuplicateTypeId`] on
    /// duplicate type ids.
    ///
    /// # Examples
    ///
    /// ```
    /// use palaver::schema::SchemaRegistry;
    ///
    /// let registry = SchemaRegistry::from_json_str(r#"[{
    ///     "type_id": "caption",
    ///     "required_keys": ["text"],
    ///     "attribute_types": {"text": {"primitive": "text"}},
    ///     "empty_value": {"text": {"text": ""}}
    /// }]"#).expect("valid registry document");
    /// assert!(registry.contains("caption"));
    /// ```
    pub fn from_json_str(document: &str) -> Result<Self, SchemaError> {
        let schemas: Vec<MessageSchema> =
            serde_json::from_str(document).map_err(|err| SchemaError::Load(err.to_string()))?;
        Self::from_schemas(schemas)
    }

    /// Looks up the schema for a message type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownType`] if the type is not registered.
    pub fn lookup(&self, type_id: &str) -> Result<&Arc<MessageSchema>, SchemaError> {
        self.schemas
            .get(type_id)
            .ok_or_else(|| SchemaError::UnknownType(type_id.to_owned()))
    }

    /// Returns `true` if the type is registered.
    #[must_use]
    pub fn contains(&self, type_id: &str) -> bool {
        self.schemas.contains_key(type_id)
    }

    /// Returns the registered type identifiers in sorted order.
    pub fn type_ids(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Returns the number of registered schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if no schemas are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// Returns the built-in schema catalogue.
///
/// Useful as a base when extending the registry with deployment-specific
/// types via [`SchemaRegistry::from_schemas`].
#[must_use]
pub fn builtin_schemas() -> Vec<MessageSchema> {
    use PrimitiveKind::{Bytes, Text};

    vec![
        sequence_schema("text", &[("text", Text)]),
        sequence_schema("image_url", &[("url", Text)]),
        sequence_schema(
            "image_base64",
            &[("filename", Text), ("image_base64", Bytes), ("mime_type", Text)],
        ),
        sequence_schema(
            "image_bytes",
            &[("filename", Text), ("image_bytes", Bytes), ("mime_type", Text)],
        ),
        sequence_schema("file_url", &[("url", Text), ("mime_type", Text)]),
        sequence_schema(
            "file_base64",
            &[("filename", Text), ("file_base64", Bytes), ("mime_type", Text)],
        ),
        sequence_schema(
            "file_bytes",
            &[("filename", Text), ("file_bytes", Bytes), ("mime_type", Text)],
        ),
        sequence_schema("audio_url", &[("url", Text), ("mime_type", Text)]),
        sequence_schema(
            "audio_base64",
            &[("filename", Text), ("audio_base64", Bytes), ("mime_type", Text)],
        ),
        sequence_schema(
            "audio_bytes",
            &[("filename", Text), ("audio_bytes", Bytes), ("mime_type", Text)],
        ),
    ]
}

/// Builds a schema whose attributes are all text or bytes, defaulting to empty.
fn sequence_schema(type_id: &str, attributes: &[(&str, PrimitiveKind)]) -> MessageSchema {
    let attribute_types: BTreeMap<String, TypeDescriptor> = attributes
        .iter()
        .map(|(key, kind)| ((*key).to_owned(), TypeDescriptor::Primitive(*kind)))
        .collect();
    let empty_value = attributes
        .iter()
        .map(|(key, kind)| {
            let empty = if matches!(kind, PrimitiveKind::Bytes) {
                AttributeValue::Bytes(Vec::new())
            } else {
                AttributeValue::Text(String::new())
            };
            ((*key).to_owned(), empty)
        })
        .collect();
    let schema = MessageSchema {
        type_id: type_id.to_owned(),
        required_keys: attribute_types.keys().cloned().collect(),
        attribute_types,
        empty_value,
    };
    debug_assert!(
        schema.check_value(&schema.empty_value).is_empty(),
        "built-in schemas must accept their own empty value",
    );
    schema
}
