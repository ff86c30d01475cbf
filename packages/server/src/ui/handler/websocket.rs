//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        rejection::QueryRejection,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    http::{HeaderMap, header::AUTHORIZATION},
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::{
        ChatError, ConnectionId, Identity, InvalidCredentialReason, OutboundEvent, SubjectId,
        Timestamp,
    },
    infrastructure::dto::websocket::{ClientEvent, ServerEvent},
    ui::{
        envelope::{guarded, report},
        state::{AppState, ConnectQuery},
    },
};

/// Handshake: the token is verified before the socket is handed over.
///
/// Either the query `token` or an `Authorization: Bearer` header is accepted;
/// the query wins when both are present. An unparseable query string is a
/// malformed credential and is answered with a `rejected` frame.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    query: Result<Query<ConnectQuery>, QueryRejection>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let authenticated = match query {
        Ok(Query(query)) => {
            let token = query.token.or_else(|| bearer_token(&headers));
            state.authenticate.authenticate(token.as_deref()).await
        }
        Err(rejection) => {
            tracing::debug!("Unparseable handshake query: {}", rejection);
            Err(ChatError::InvalidCredential(InvalidCredentialReason::Malformed))
        }
    };

    ws.on_upgrade(move |socket| async move {
        match authenticated {
            Ok(identity) => handle_socket(socket, state, identity).await,
            Err(error) => reject(socket, error).await,
        }
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

/// Send exactly one `rejected` frame, then close. Nothing is read.
async fn reject(mut socket: WebSocket, error: ChatError) {
    tracing::warn!(
        handler = "connect",
        error_kind = error.kind(),
        "Handshake rejected: {}",
        error
    );

    let rejected = ServerEvent::Rejected {
        error_kind: error.kind().to_string(),
        client_message: error.client_message().to_string(),
    };
    match serde_json::to_string(&rejected) {
        Ok(json) => {
            if let Err(e) = socket.send(Message::Text(json.into())).await {
                tracing::debug!("Failed to send rejection: {}", e);
            }
        }
        Err(e) => tracing::error!("Failed to serialize rejection: {}", e),
    }

    let close = Message::Close(Some(CloseFrame {
        code: close_code::POLICY,
        reason: error.kind().to_string().into(),
    }));
    if let Err(e) = socket.send(close).await {
        tracing::debug!("Failed to close rejected socket: {}", e);
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, identity: Identity) {
    let (mut sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive events
    let (tx, mut rx) = mpsc::unbounded_channel::<OutboundEvent>();
    let subject_id = identity.subject_id.clone();
    let display_name = identity.display_name.clone();
    let expires_at = identity.expires_at;
    let connection_id = state.authenticate.register(identity, tx).await;
    tracing::info!(
        "Connection '{}' authenticated as '{}' (token expires {})",
        connection_id,
        subject_id,
        expires_at
    );

    let connected = ServerEvent::Connected {
        connection_id: connection_id.to_string(),
        subject_id: subject_id.to_string(),
        display_name,
    };
    if let Err(e) = send_event(&mut sender, &connected).await {
        tracing::warn!("Failed to send connected to '{}': {}", connection_id, e);
        state.disconnect.execute(&connection_id).await;
        return;
    }

    // Forward outbound events to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if send_event(&mut sender, &ServerEvent::from(event)).await.is_err() {
                break;
            }
        }
    });

    // Inbound events are processed in order on this task, so a disconnect
    // never cancels a handler half way through.
    loop {
        tokio::select! {
            frame = receiver.next() => {
                let frame = match frame {
                    Some(Ok(frame)) => frame,
                    Some(Err(e)) => {
                        tracing::debug!("WebSocket error on '{}': {}", connection_id, e);
                        break;
                    }
                    None => break,
                };
                match frame {
                    Message::Text(text) => {
                        dispatch(&state, &connection_id, &subject_id, text.as_str()).await;
                    }
                    Message::Close(_) => {
                        tracing::info!("Connection '{}' requested close", connection_id);
                        break;
                    }
                    // Binary frames are not part of the protocol; ping/pong is
                    // answered by the transport.
                    _ => {}
                }
            }
            _ = &mut send_task => break,
        }
    }

    state.disconnect.execute(&connection_id).await;
    send_task.abort();
}

/// Route one inbound text frame to its use case.
async fn dispatch(
    state: &AppState,
    connection_id: &ConnectionId,
    subject_id: &SubjectId,
    text: &str,
) {
    let registry = state.registry.as_ref();
    registry.touch(connection_id, Timestamp::now()).await;

    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            let error = ChatError::ValidationError(format!("invalid client event: {e}"));
            report("parse", connection_id, subject_id, registry, &error).await;
            return;
        }
    };

    let handler = event.name();
    match event {
        ClientEvent::Join { room_id } => {
            let execute = state.join_room.execute(connection_id, room_id);
            guarded(handler, connection_id, subject_id, registry, execute).await;
        }
        ClientEvent::Leave { room_id } => {
            let execute = state.leave_room.execute(connection_id, room_id);
            guarded(handler, connection_id, subject_id, registry, execute).await;
        }
        ClientEvent::Message { room_id, body } => {
            let execute = state.send_message.execute(connection_id, room_id, body);
            if let Some(message_id) =
                guarded(handler, connection_id, subject_id, registry, execute).await
            {
                tracing::debug!("Connection '{}' sent '{}'", connection_id, message_id);
            }
        }
        ClientEvent::Typing { room_id } => {
            let execute = state.signal_typing.start(connection_id, room_id);
            guarded(handler, connection_id, subject_id, registry, execute).await;
        }
        ClientEvent::StopTyping { room_id } => {
            let execute = state.signal_typing.stop(connection_id, room_id);
            guarded(handler, connection_id, subject_id, registry, execute).await;
        }
    }
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).map_err(axum::Error::new)?;
    sender.send(Message::Text(json.into())).await
}
