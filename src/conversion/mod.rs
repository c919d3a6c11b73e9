//! Projection of transcripts into chat-completion requests.
//!
//! Follows the same hexagonal layout as the rest of the crate:
//!
//! - **Domain**: [`FileFormat`](domain::FileFormat), [`Payload`](domain::Payload)
//!   and the serialisable [`RequestMessage`](domain::RequestMessage)
//! - **Ports**: [`ContentExtractor`](ports::ContentExtractor) and
//!   [`AudioTranscriber`](ports::AudioTranscriber), both async
//! - **Adapters**: [`TextualExtractor`](adapters::TextualExtractor) for
//!   formats that are already text
//! - **Services**: [`RequestProjector`](services::RequestProjector)
//!
//! # Example
//!
//! ```
//! use palaver::conversion::domain::{ContentBlock, RequestRole};
//! use palaver::message::domain::AuthorRole;
//!
//! assert_eq!(RequestRole::from(AuthorRole::Generative), RequestRole::Assistant);
//! assert_eq!(ContentBlock::text("hi").as_text(), Some("hi"));
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
