//! Ephemeral presence state (never persisted).

pub mod typing;

pub use typing::{TypingOutcome, TypingTracker};
