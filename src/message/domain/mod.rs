//! Domain types for the message subsystem.
//!
//! Messages are owned values with private fields; every mutation goes
//! through a validating method that either commits fully or leaves the
//! message untouched.

mod author;
mod envelope;
mod message;
mod metadata;
mod multi_part;
mod role;
mod single_part;
pub(crate) mod structured;

pub use author::Author;
pub use message::Message;
pub use metadata::Metadata;
pub use multi_part::MultiPartMessage;
pub(crate) use multi_part::{check_authors, reject_composite_type};
pub use role::{AuthorRole, ParseAuthorRoleError};
pub use single_part::{SinglePartMessage, SinglePartMessageBuilder};
