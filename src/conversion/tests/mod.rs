//! Unit tests for request projection.

mod format_tests;
