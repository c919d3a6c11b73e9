//! Domain types for request projection.

mod format;
mod payload;
mod request;

pub use format::FileFormat;
pub use payload::Payload;
pub use request::{ContentBlock, ImageUrl, RequestMessage, RequestRole};
