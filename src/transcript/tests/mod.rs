//! Unit tests for the transcript module.

mod shared_tests;

use crate::schema::{AttributeValue, ValueMap};

pub(super) fn text_chunk(text: &str) -> ValueMap {
    ValueMap::from([("text".to_owned(), AttributeValue::from(text))])
}

pub(super) fn url_chunk(url: &str) -> ValueMap {
    ValueMap::from([("url".to_owned(), AttributeValue::from(url))])
}
