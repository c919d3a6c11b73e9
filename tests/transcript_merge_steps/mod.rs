//! Step definitions for transcript merging scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
