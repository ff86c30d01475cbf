//! Roomcast real-time messaging server.
//!
//! Run with:
//! ```not_rust
//! ROOMCAST_JWT_SECRET=dev cargo run --bin roomcast-server -- serve --directory-file directory.json
//! ROOMCAST_JWT_SECRET=dev cargo run --bin roomcast-server -- issue-token --subject alice
//! ```

use clap::Parser;
use roomcast_server::{
    config::{Cli, Command, IssueTokenArgs},
    domain::SubjectId,
    error::ServerError,
    infrastructure::auth::JwtCredentialVerifier,
};
use roomcast_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), cli.command.log_level());

    let result = match cli.command {
        Command::Serve(config) => roomcast_server::run(config).await,
        Command::IssueToken(args) => issue_token(args),
    };

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

fn issue_token(args: IssueTokenArgs) -> Result<(), ServerError> {
    let subject = SubjectId::new(args.subject)
        .map_err(|e| ServerError::Config(format!("invalid subject: {e}")))?;
    let verifier = JwtCredentialVerifier::new(args.jwt_secret.as_bytes());
    let token = verifier.issue(&subject, args.name.as_deref(), args.ttl_secs)?;
    println!("{token}");
    Ok(())
}
