//! Message value schemas and structural type validation.
//!
//! Every single-part message value is checked against a [`MessageSchema`]
//! drawn from a [`SchemaRegistry`]. Schemas are data: each one is a set of
//! required keys, a [`TypeDescriptor`] per key and an empty default value,
//! so new message types are added by registering entries rather than by
//! changing code.
//!
//! # Example
//!
//! ```
//! use palaver::schema::{AttributeValue, SchemaRegistry, ValueMap};
//!
//! let registry = SchemaRegistry::builtin();
//! let schema = registry.lookup("text").expect("text is built in");
//!
//! let value = ValueMap::from([("text".to_owned(), AttributeValue::from("hi"))]);
//! assert!(schema.check_value(&value).is_empty());
//! ```

pub mod descriptor;
pub mod error;
pub mod registry;
pub mod validator;
pub mod value;

pub use descriptor::{PrimitiveKind, TypeDescriptor};
pub use error::SchemaError;
pub use registry::{
    MULTIPART_TYPE, MessageSchema, SchemaDefinition, SchemaRegistry, SchemaViolation,
    builtin_schemas, join_violations,
};
pub use validator::{TypeMismatch, validate};
pub use value::{AttributeValue, ValueKind, ValueMap};

#[cfg(test)]
mod tests;
