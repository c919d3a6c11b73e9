//! Schema-validated single-part and composite messages.
//!
//! A [`domain::SinglePartMessage`] is one fragment whose value always
//! satisfies its type's schema. A [`domain::MultiPartMessage`] folds several
//! fragments from the same author into one turn. [`domain::Message`] is the
//! sum of the two, as stored in a transcript.
//!
//! # Example
//!
//! ```
//! use palaver::message::domain::{Author, SinglePartMessage};
//! use palaver::schema::{AttributeValue, SchemaRegistry, ValueMap};
//! use mockable::DefaultClock;
//!
//! let clock = DefaultClock;
//! let registry = SchemaRegistry::builtin();
//! let value = ValueMap::from([("text".to_owned(), AttributeValue::from("Hello"))]);
//! let message = SinglePartMessage::create(
//!     &registry,
//!     Author::human("ada"),
//!     "text",
//!     Some(value),
//!     &clock,
//! )
//! .expect("valid text message");
//!
//! let restored = SinglePartMessage::from_structured(&message.to_structured(), &registry)
//!     .expect("round trip");
//! assert_eq!(restored, message);
//! ```

pub mod domain;
pub mod error;

#[cfg(test)]
mod tests;
