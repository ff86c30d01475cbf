//! Shared test fixtures for integration tests.
//!
//! Starts the server in process on an ephemeral port with a seeded directory:
//! `group-1` = {alice, carol}, `group-2` = {dave}. Only alice has a directory
//! display name ("Alice").

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use roomcast_server::{
    domain::{ChatPolicy, SubjectId},
    infrastructure::{
        auth::JwtCredentialVerifier,
        registry::InMemoryRoomRegistry,
        repository::{InMemoryDirectory, InMemoryMessageStore},
    },
    ui::state::{AppState, Collaborators},
};
use serde_json::Value;
use tokio::{net::TcpStream, sync::oneshot, task::JoinHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{
        Message,
        client::IntoClientRequest,
        http::{HeaderValue, header::AUTHORIZATION},
    },
};

pub const SECRET: &[u8] = b"integration-secret";

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Test server that shuts down when dropped
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with_policy(ChatPolicy::default()).await
    }

    pub async fn start_with_policy(policy: ChatPolicy) -> Self {
        let directory = InMemoryDirectory::new();
        directory.add_member("group-1", "alice").await;
        directory.add_member("group-1", "carol").await;
        directory.add_member("group-2", "dave").await;
        directory.set_display_name("alice", "Alice").await;
        let directory = Arc::new(directory);

        let collaborators = Collaborators {
            verifier: Arc::new(JwtCredentialVerifier::new(SECRET)),
            membership: directory.clone(),
            store: Arc::new(InMemoryMessageStore::new()),
            users: directory,
        };
        let state = Arc::new(AppState::new(
            Arc::new(InMemoryRoomRegistry::new()),
            collaborators,
            policy,
        ));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let (shutdown, signal) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let shutdown_signal = async move {
                let _ = signal.await;
            };
            if let Err(e) = roomcast_server::serve(listener, state, shutdown_signal).await {
                eprintln!("test server failed: {e}");
            }
        });

        Self {
            addr,
            shutdown: Some(shutdown),
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Connect with the token in the query string; returns the raw stream.
    pub async fn connect_raw(&self, token: Option<&str>) -> WsStream {
        let url = match token {
            Some(token) => format!("{}?token={}", self.ws_url(), token),
            None => self.ws_url(),
        };
        let (ws, _) = connect_async(url).await.expect("Failed to connect");
        ws
    }

    /// Connect with a raw query string appended to the endpoint.
    pub async fn connect_with_query(&self, query: &str) -> WsStream {
        let (ws, _) = connect_async(format!("{}?{}", self.ws_url(), query))
            .await
            .expect("Failed to connect");
        ws
    }

    /// Connect with an `Authorization: Bearer` header.
    pub async fn connect_with_header(&self, token: &str) -> WsStream {
        let mut request = self
            .ws_url()
            .into_client_request()
            .expect("Failed to build request");
        request.headers_mut().insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).expect("Invalid header"),
        );
        let (ws, _) = connect_async(request).await.expect("Failed to connect");
        ws
    }

    /// Connect as `subject` and consume the `connected` event.
    pub async fn connect(&self, subject: &str) -> (WsStream, Value) {
        let mut ws = self.connect_raw(Some(&token(subject, None))).await;
        let connected = next_event(&mut ws).await;
        assert_eq!(connected["type"], "connected", "unexpected first event");
        (ws, connected)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.handle.abort();
    }
}

/// Sign a token valid for one hour.
pub fn token(subject: &str, name: Option<&str>) -> String {
    let subject = SubjectId::new(subject.to_string()).expect("Invalid subject");
    JwtCredentialVerifier::new(SECRET)
        .issue(&subject, name, 3600)
        .expect("Failed to issue token")
}

pub async fn send_event(ws: &mut WsStream, event: Value) {
    ws.send(Message::Text(event.to_string().into()))
        .await
        .expect("Failed to send event");
}

/// Next JSON text frame, failing the test after two seconds.
pub async fn next_event(ws: &mut WsStream) -> Value {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str::<Value>(text.as_str())
                        .expect("Server sent invalid JSON");
                }
                Some(Ok(Message::Close(frame))) => panic!("connection closed: {frame:?}"),
                Some(Ok(_)) => continue,
                Some(Err(e)) => panic!("websocket error: {e}"),
                None => panic!("stream ended"),
            }
        }
    })
    .await
    .expect("Timed out waiting for an event")
}

/// Assert that no text frame arrives within `within`.
pub async fn expect_silence(ws: &mut WsStream, within: Duration) {
    let result = tokio::time::timeout(within, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => return text.as_str().to_string(),
                Some(Ok(_)) => continue,
                _ => std::future::pending::<()>().await,
            }
        }
    })
    .await;
    if let Ok(text) = result {
        panic!("expected no event, got {text}");
    }
}

/// Join `room_id` and wait for the `joined` confirmation.
pub async fn join(ws: &mut WsStream, room_id: &str) {
    send_event(ws, serde_json::json!({"type": "join", "roomId": room_id})).await;
    let event = next_event(ws).await;
    assert_eq!(event["type"], "joined", "join failed: {event}");
    assert_eq!(event["roomId"], room_id);
}
