//! Ports for the external collaborators of request projection.

pub mod extractor;
pub mod transcriber;

pub use extractor::ContentExtractor;
pub use transcriber::AudioTranscriber;
