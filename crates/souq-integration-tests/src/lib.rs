//! Integration test crate for the Souq trade core.
//!
//! This crate exists solely to run integration tests that span multiple Souq crates.
//! It has no public API - all functionality is in the test modules.

#![forbid(unsafe_code)]
