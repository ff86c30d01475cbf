//! In-memory collaborators for development and tests.

pub mod directory;
pub mod message_store;

pub use directory::{DirectoryFile, InMemoryDirectory};
pub use message_store::InMemoryMessageStore;
