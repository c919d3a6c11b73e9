//! Helpers for decoding the structured (nested key-value) representation.

use crate::message::error::MessageError;
use crate::schema::{AttributeValue, ValueMap};
use chrono::{DateTime, SecondsFormat, Utc};

pub(crate) fn as_record<'a>(
    value: &'a AttributeValue,
    what: &str,
) -> Result<&'a ValueMap, MessageError> {
    value
        .as_map()
        .ok_or_else(|| MessageError::malformed(format!("{what} must be a map")))
}

pub(crate) fn field<'a>(
    record: &'a ValueMap,
    key: &str,
) -> Result<&'a AttributeValue, MessageError> {
    record
        .get(key)
        .ok_or_else(|| MessageError::malformed(format!("missing field '{key}'")))
}

pub(crate) fn text_field<'a>(record: &'a ValueMap, key: &str) -> Result<&'a str, MessageError> {
    field(record, key)?
        .as_text()
        .ok_or_else(|| MessageError::malformed(format!("field '{key}' must be text")))
}

pub(crate) fn map_field<'a>(record: &'a ValueMap, key: &str) -> Result<&'a ValueMap, MessageError> {
    field(record, key)?
        .as_map()
        .ok_or_else(|| MessageError::malformed(format!("field '{key}' must be a map")))
}

pub(crate) fn list_field<'a>(
    record: &'a ValueMap,
    key: &str,
) -> Result<&'a [AttributeValue], MessageError> {
    field(record, key)?
        .as_list()
        .ok_or_else(|| MessageError::malformed(format!("field '{key}' must be a list")))
}

pub(crate) fn encode_timestamp(timestamp: DateTime<Utc>) -> AttributeValue {
    AttributeValue::Text(timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true))
}

pub(crate) fn timestamp_field(record: &ValueMap, key: &str) -> Result<DateTime<Utc>, MessageError> {
    let raw = text_field(record, key)?;
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| MessageError::malformed(format!("field '{key}' is not RFC 3339: {err}")))
}
