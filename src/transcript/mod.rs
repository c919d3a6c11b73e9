//! Transcripts: ordered turns and the rules for merging fragments into them.
//!
//! # Architecture
//!
//! - **Domain**: the [`domain::Transcript`] aggregate and its merge rules
//! - **Validation**: invariant checks behind [`domain::Transcript::audit`]
//! - **Services**: [`services::SharedTranscript`] for concurrent readers and
//!   one streaming writer
//!
//! # Example
//!
//! ```
//! use palaver::message::domain::{Author, SinglePartMessage};
//! use palaver::schema::{AttributeValue, SchemaRegistry, ValueMap};
//! use palaver::transcript::domain::Transcript;
//! use mockable::DefaultClock;
//!
//! let clock = DefaultClock;
//! let registry = SchemaRegistry::builtin();
//! let mut transcript = Transcript::new("demo", &clock);
//! let ada = Author::human("ada");
//!
//! for text in ["first", "second"] {
//!     let value = ValueMap::from([("text".to_owned(), AttributeValue::from(text))]);
//!     let message = SinglePartMessage::create(&registry, ada.clone(), "text", Some(value), &clock)
//!         .expect("valid text message");
//!     transcript.append_message(message, &clock).expect("same author merges");
//! }
//!
//! assert_eq!(transcript.len(), 1);
//! assert!(transcript.message_type_tags().contains("multipart"));
//! assert!(transcript.audit().is_empty());
//! ```

pub mod domain;
pub mod error;
pub mod services;
pub mod validation;

#[cfg(test)]
mod tests;
