//! Real-time server transport: router, handlers and lifecycle.

pub mod envelope;
mod handler;
mod runner;
mod signal;
pub mod state;

pub use runner::{build_router, run, serve};
