//! Services coordinating access to transcripts.

pub mod shared;

pub use shared::{SharedTranscript, StreamWriter};
