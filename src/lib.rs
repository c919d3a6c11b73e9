//! Palaver: conversational transcript aggregation.
//!
//! This crate models the messages exchanged between humans, generative
//! models and developers, and folds streamed chunks of those messages into
//! an ordered transcript of turns.
//!
//! # Architecture
//!
//! Palaver follows hexagonal architecture principles:
//!
//! - **Domain**: Pure message and transcript logic with no I/O
//! - **Ports**: Abstract trait interfaces for validation, extraction and
//!   transcription
//! - **Adapters**: Concrete implementations of ports
//!
//! # Modules
//!
//! - [`schema`]: Attribute values and the registry of message type schemas
//! - [`message`]: Single-part and composite messages
//! - [`transcript`]: The transcript aggregate, its merge rules, validation
//!   and shared streaming access
//! - [`conversion`]: Projection of transcripts into chat-completion requests

pub mod conversion;
pub mod message;
pub mod schema;
pub mod transcript;

#[cfg(test)]
pub(crate) mod test_support;
