//! Integration tests for vidharvest
//!
//! These tests use wiremock to stand in for the video API and exercise the
//! real HTTP client, the harvest engine, and the CSV checkpoints end-to-end.

mod client_tests;
mod harvest_tests;
