//! Invariant checks over a transcript's message list.
//!
//! [`crate::transcript::domain::Transcript`] upholds these on every append.
//! They are re-checked whenever turns arrive from outside the merge rules:
//! decoding a structured form, or appending messages validated against a
//! different registry.

pub mod invariants;

pub use invariants::{audit, registry_conformance, repeated_authors};
