//! WebSocket message DTOs for the real-time protocol.

use serde::{Deserialize, Serialize};

use crate::domain::OutboundEvent;

/// Events a client may emit after the handshake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    Join { room_id: String },
    #[serde(rename_all = "camelCase")]
    Leave { room_id: String },
    #[serde(rename_all = "camelCase")]
    Message { room_id: String, body: String },
    #[serde(rename_all = "camelCase")]
    Typing { room_id: String },
    #[serde(rename_all = "camelCase")]
    StopTyping { room_id: String },
}

impl ClientEvent {
    /// Handler name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Join { .. } => "join",
            ClientEvent::Leave { .. } => "leave",
            ClientEvent::Message { .. } => "message",
            ClientEvent::Typing { .. } => "typing",
            ClientEvent::StopTyping { .. } => "stopTyping",
        }
    }
}

/// Chat message as seen by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub message_id: String,
    pub room_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub body: String,
    /// Unix timestamp (milliseconds since epoch, UTC)
    pub sent_at: i64,
}

/// Events the server pushes to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Handshake accepted
    #[serde(rename_all = "camelCase")]
    Connected {
        connection_id: String,
        subject_id: String,
        display_name: String,
    },
    /// Handshake refused; the socket is closed right after
    #[serde(rename_all = "camelCase")]
    Rejected {
        error_kind: String,
        client_message: String,
    },
    Message(MessagePayload),
    #[serde(rename_all = "camelCase")]
    TypingStatus {
        room_id: String,
        sender_id: String,
        is_typing: bool,
    },
    #[serde(rename_all = "camelCase")]
    Error {
        error_kind: String,
        client_message: String,
    },
    #[serde(rename_all = "camelCase")]
    Joined { room_id: String },
    #[serde(rename_all = "camelCase")]
    Left { room_id: String },
}

impl From<OutboundEvent> for ServerEvent {
    fn from(event: OutboundEvent) -> Self {
        match event {
            OutboundEvent::Joined { room_id } => ServerEvent::Joined {
                room_id: room_id.into_string(),
            },
            OutboundEvent::Left { room_id } => ServerEvent::Left {
                room_id: room_id.into_string(),
            },
            OutboundEvent::Message(message) => ServerEvent::Message(MessagePayload {
                message_id: message.id.to_string(),
                room_id: message.room_id.into_string(),
                sender_id: message.sender_id.into_string(),
                sender_name: message.sender_name,
                body: message.body.into_string(),
                sent_at: message.sent_at.value(),
            }),
            OutboundEvent::TypingStatus {
                room_id,
                sender_id,
                is_typing,
            } => ServerEvent::TypingStatus {
                room_id: room_id.into_string(),
                sender_id: sender_id.into_string(),
                is_typing,
            },
            OutboundEvent::Error {
                error_kind,
                client_message,
            } => ServerEvent::Error {
                error_kind: error_kind.to_string(),
                client_message: client_message.to_string(),
            },
        }
    }
}
