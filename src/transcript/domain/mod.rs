//! Domain types for the transcript subsystem.

mod attachment;
mod transcript;

pub use attachment::DeveloperAttachment;
pub use transcript::Transcript;
