//! Integration tests for the engine client
//!
//! These tests use wiremock to stand in for a Heritrix3 engine and check
//! the requests each operation sends and how responses are interpreted.

mod common;
mod job_tests;
mod transport_tests;
