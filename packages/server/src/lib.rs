//! Real-time room messaging server.
//!
//! Authenticated WebSocket connections join group or private rooms, exchange
//! persisted messages and ephemeral typing presence.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use ui::{build_router, run, serve};
