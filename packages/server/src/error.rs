//! Process-level errors (startup, configuration, serving).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to load directory file '{path}': {source}")]
    DirectoryFile {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("failed to issue token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}
