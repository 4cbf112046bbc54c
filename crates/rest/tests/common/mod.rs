//! Shared test infrastructure for the API integration tests.

pub mod harness;
