//! Shared utilities for Roomcast binaries and tests.

pub mod logger;
pub mod time;
