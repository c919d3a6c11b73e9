//! Adapters implementing the conversion ports.

pub mod textual;

pub use textual::TextualExtractor;
