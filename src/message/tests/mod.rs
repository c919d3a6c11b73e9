//! Unit tests for the message module.
//!
//! Tests are organised by domain concept, covering happy paths, error cases,
//! and edge cases for all public APIs.

mod multi_part_tests;
