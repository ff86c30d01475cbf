//! Server state shared by every handler.

use serde::Deserialize;
use std::sync::Arc;

use crate::{
    domain::{
        ChatPolicy, CredentialVerifier, MembershipDirectory, MessageStore, RoomRegistry,
        UserDirectory,
    },
    infrastructure::presence::TypingTracker,
    usecase::{
        AuthenticateConnectionUseCase, DisconnectConnectionUseCase, JoinRoomUseCase,
        LeaveRoomUseCase, SendMessageUseCase, SignalTypingUseCase,
    },
};

/// Query parameters for WebSocket connection
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

/// Collaborators the server is wired with
pub struct Collaborators {
    pub verifier: Arc<dyn CredentialVerifier>,
    pub membership: Arc<dyn MembershipDirectory>,
    pub store: Arc<dyn MessageStore>,
    pub users: Arc<dyn UserDirectory>,
}

/// Shared application state
pub struct AppState {
    /// Room Registry（全接続で共有される唯一の可変状態）
    pub registry: Arc<dyn RoomRegistry>,
    pub authenticate: AuthenticateConnectionUseCase,
    pub join_room: JoinRoomUseCase,
    pub leave_room: LeaveRoomUseCase,
    pub send_message: SendMessageUseCase,
    pub signal_typing: SignalTypingUseCase,
    pub disconnect: DisconnectConnectionUseCase,
}

impl AppState {
    /// Build the use cases around one registry and one typing tracker.
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        collaborators: Collaborators,
        policy: ChatPolicy,
    ) -> Self {
        let tracker = Arc::new(TypingTracker::new(
            registry.clone(),
            policy.typing_debounce,
            policy.typing_ttl,
        ));

        Self {
            authenticate: AuthenticateConnectionUseCase::new(
                collaborators.verifier,
                collaborators.users,
                registry.clone(),
                policy,
            ),
            join_room: JoinRoomUseCase::new(registry.clone(), collaborators.membership, policy),
            leave_room: LeaveRoomUseCase::new(registry.clone()),
            send_message: SendMessageUseCase::new(registry.clone(), collaborators.store, policy),
            signal_typing: SignalTypingUseCase::new(registry.clone(), tracker),
            disconnect: DisconnectConnectionUseCase::new(registry.clone()),
            registry,
        }
    }
}
