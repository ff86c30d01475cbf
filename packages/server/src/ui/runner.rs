//! Server runner: wiring, router and serve loop.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    error::ServerError,
    infrastructure::{
        auth::JwtCredentialVerifier,
        registry::InMemoryRoomRegistry,
        repository::{DirectoryFile, InMemoryDirectory, InMemoryMessageStore},
    },
    ui::{
        handler::{get_rooms, health_check, websocket_handler},
        signal::shutdown_signal,
        state::{AppState, Collaborators},
    },
};

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/rooms", get(get_rooms))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wire the in-memory collaborators described by `config`.
async fn build_state(config: &ServerConfig) -> Result<Arc<AppState>, ServerError> {
    let directory = match &config.directory_file {
        Some(path) => {
            let file = DirectoryFile::load(path).await?;
            let directory = InMemoryDirectory::from_file(file);
            tracing::info!(
                "Loaded {} group(s) from '{}'",
                directory.group_count().await,
                path.display()
            );
            directory
        }
        None => {
            tracing::warn!("No directory file given; every group join will be refused");
            InMemoryDirectory::new()
        }
    };
    let directory = Arc::new(directory);

    let collaborators = Collaborators {
        verifier: Arc::new(JwtCredentialVerifier::new(config.jwt_secret.as_bytes())),
        membership: directory.clone(),
        store: Arc::new(InMemoryMessageStore::new()),
        users: directory,
    };

    Ok(Arc::new(AppState::new(
        Arc::new(InMemoryRoomRegistry::new()),
        collaborators,
        config.policy(),
    )))
}

/// Run the server until Ctrl-C or SIGTERM.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    config.validate()?;
    let addr = config.bind_addr()?;
    let state = build_state(&config).await?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    serve(listener, state, shutdown_signal()).await
}
