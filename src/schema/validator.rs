//! Recursive structural validation of attribute values.
//!
//! The validator is a pure function over a [`TypeDescriptor`] tree. On
//! failure it reports where inside the value the mismatch occurred and which
//! shape was expected there.

use super::descriptor::TypeDescriptor;
use super::value::AttributeValue;
use std::fmt;

/// A structural mismatch between a value and its descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    /// Location inside the validated value, rooted at `$`.
    pub path: String,
    /// The expected shape at `path`.
    pub expected: String,
    /// What was found at `path`.
    pub found: String,
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "at {}: expected {}, found {}",
            self.path, self.expected, self.found
        )
    }
}

impl std::error::Error for TypeMismatch {}

/// Validates `value` against `descriptor`.
///
/// # Errors
///
/// Returns the first [`TypeMismatch`] encountered in a depth-first walk.
///
/// # Examples
///
/// ```
/// use palaver::schema::{AttributeValue, TypeDescriptor, validate};
///
/// let descriptor = TypeDescriptor::list(TypeDescriptor::text());
/// let good = AttributeValue::List(vec!["a".into(), "b".into()]);
/// let bad = AttributeValue::List(vec!["a".into(), 3_i64.into()]);
///
/// assert!(validate(&good, &descriptor).is_ok());
/// let mismatch = validate(&bad, &descriptor).expect_err("integer in text list");
/// assert_eq!(mismatch.path, "$[1]");
/// ```
pub fn validate(value: &AttributeValue, descriptor: &TypeDescriptor) -> Result<(), TypeMismatch> {
    validate_at(value, descriptor, "$")
}

fn validate_at(
    value: &AttributeValue,
    descriptor: &TypeDescriptor,
    path: &str,
) -> Result<(), TypeMismatch> {
    match descriptor {
        TypeDescriptor::Primitive(kind) => {
            if kind.matches(value) {
                Ok(())
            } else {
                Err(mismatch(path, descriptor, value.kind().as_str()))
            }
        }
        TypeDescriptor::Sum(alternatives) => {
            if alternatives
                .iter()
                .any(|alternative| validate_at(value, alternative, path).is_ok())
            {
                Ok(())
            } else {
                Err(mismatch(path, descriptor, value.kind().as_str()))
            }
        }
        TypeDescriptor::Literal(allowed) => {
            if allowed.contains(value) {
                Ok(())
            } else {
                Err(mismatch(path, descriptor, "a value outside the literal set"))
            }
        }
        TypeDescriptor::List(element) => {
            let items = list_items(value, path, descriptor)?;
            validate_elements(items, element, path)
        }
        TypeDescriptor::Map {
            key,
            value: value_descriptor,
        } => {
            let Some(entries) = value.as_map() else {
                return Err(mismatch(path, descriptor, value.kind().as_str()));
            };
            for (entry_key, entry_value) in entries {
                let entry_path = format!("{path}.{entry_key}");
                validate_at(
                    &AttributeValue::Text(entry_key.clone()),
                    key,
                    &format!("{entry_path} (key)"),
                )?;
                validate_at(entry_value, value_descriptor, &entry_path)?;
            }
            Ok(())
        }
        TypeDescriptor::Tuple { elements, variadic } => {
            let items = list_items(value, path, descriptor)?;
            if *variadic {
                return match elements.first() {
                    Some(element) => validate_elements(items, element, path),
                    None if items.is_empty() => Ok(()),
                    None => Err(mismatch(path, descriptor, "a non-empty list")),
                };
            }
            if items.len() != elements.len() {
                return Err(mismatch(
                    path,
                    descriptor,
                    &format!("a list of length {}", items.len()),
                ));
            }
            for (index, (item, element)) in items.iter().zip(elements).enumerate() {
                validate_at(item, element, &format!("{path}[{index}]"))?;
            }
            Ok(())
        }
    }
}

fn list_items<'a>(
    value: &'a AttributeValue,
    path: &str,
    descriptor: &TypeDescriptor,
) -> Result<&'a [AttributeValue], TypeMismatch> {
    value
        .as_list()
        .ok_or_else(|| mismatch(path, descriptor, value.kind().as_str()))
}

fn validate_elements(
    items: &[AttributeValue],
    element: &TypeDescriptor,
    path: &str,
) -> Result<(), TypeMismatch> {
    for (index, item) in items.iter().enumerate() {
        validate_at(item, element, &format!("{path}[{index}]"))?;
    }
    Ok(())
}

fn mismatch(path: &str, descriptor: &TypeDescriptor, found: &str) -> TypeMismatch {
    TypeMismatch {
        path: path.to_owned(),
        expected: descriptor.to_string(),
        found: found.to_owned(),
    }
}
