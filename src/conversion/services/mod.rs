//! Conversion services.

pub mod projector;

pub use projector::RequestProjector;
