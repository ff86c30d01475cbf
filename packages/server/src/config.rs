//! Command line and environment configuration.

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};

use crate::{domain::ChatPolicy, error::ServerError};

#[derive(Parser, Debug)]
#[command(name = "roomcast-server")]
#[command(about = "Real-time room messaging server over WebSocket")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the server
    Serve(ServerConfig),
    /// Mint a signed bearer token for local development
    IssueToken(IssueTokenArgs),
}

impl Command {
    /// Default log level requested by the subcommand
    pub fn log_level(&self) -> &str {
        match self {
            Command::Serve(config) => &config.log_level,
            Command::IssueToken(_) => "warn",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    #[arg(long, env = "ROOMCAST_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Bind port
    #[arg(long, env = "ROOMCAST_PORT", default_value_t = 8080)]
    pub port: u16,

    /// HMAC secret used to verify bearer tokens
    #[arg(long, env = "ROOMCAST_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Maximum message body length in characters, after trimming
    #[arg(long, env = "ROOMCAST_MAX_MESSAGE_LENGTH", default_value_t = 2000)]
    pub max_message_length: usize,

    /// Outbound typing fan-out window
    #[arg(long, env = "ROOMCAST_TYPING_DEBOUNCE_MS", default_value_t = 500)]
    pub typing_debounce_ms: u64,

    /// Typing signal lifetime without refresh
    #[arg(long, env = "ROOMCAST_TYPING_TTL_MS", default_value_t = 5000)]
    pub typing_ttl_ms: u64,

    /// Bound on membership and persistence calls
    #[arg(long, env = "ROOMCAST_COLLABORATOR_TIMEOUT_MS", default_value_t = 5000)]
    pub collaborator_timeout_ms: u64,

    /// JSON file seeding the in-memory group/user directory
    #[arg(long, env = "ROOMCAST_DIRECTORY_FILE")]
    pub directory_file: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, env = "ROOMCAST_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    /// Reject values that would make the server unusable.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.jwt_secret.is_empty() {
            return Err(ServerError::Config("jwt-secret must not be empty".to_string()));
        }
        let zero = [
            ("max-message-length", self.max_message_length as u64),
            ("typing-debounce-ms", self.typing_debounce_ms),
            ("typing-ttl-ms", self.typing_ttl_ms),
            ("collaborator-timeout-ms", self.collaborator_timeout_ms),
        ]
        .into_iter()
        .find(|(_, value)| *value == 0);
        if let Some((name, _)) = zero {
            return Err(ServerError::Config(format!("{name} must be greater than zero")));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid bind address: {e}")))
    }

    pub fn policy(&self) -> ChatPolicy {
        ChatPolicy {
            max_message_length: self.max_message_length,
            typing_debounce: Duration::from_millis(self.typing_debounce_ms),
            typing_ttl: Duration::from_millis(self.typing_ttl_ms),
            collaborator_timeout: Duration::from_millis(self.collaborator_timeout_ms),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct IssueTokenArgs {
    /// Subject the token is issued for
    #[arg(long)]
    pub subject: String,

    /// Display name claim
    #[arg(long)]
    pub name: Option<String>,

    /// Token lifetime in seconds
    #[arg(long, default_value_t = 3600)]
    pub ttl_secs: u64,

    #[arg(long, env = "ROOMCAST_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,
}
