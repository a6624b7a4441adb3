//! Shared helpers for the integration test suites.

// Each suite uses a different subset of the fixtures
#![allow(dead_code)]
