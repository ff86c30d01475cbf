//! Core domain models for the real-time messaging subsystem.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::value_object::{
    ConnectionId, MessageBody, MessageId, RoomId, RoomKind, SubjectId, Timestamp,
};

/// Who is on the other end of a connection.
///
/// Derived once from a verified token and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject_id: SubjectId,
    pub display_name: String,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
}

impl Identity {
    pub fn new(
        subject_id: SubjectId,
        display_name: String,
        issued_at: Timestamp,
        expires_at: Timestamp,
    ) -> Self {
        Self {
            subject_id,
            display_name,
            issued_at,
            expires_at,
        }
    }
}

/// Result of a successful token verification.
///
/// `name_claimed` is false when the token carried no usable display name and
/// `identity.display_name` fell back to the subject id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedCredential {
    pub identity: Identity,
    pub name_claimed: bool,
}

/// A live, authenticated connection as tracked by the Room Registry
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub identity: Identity,
    /// Rooms this connection has joined (mutated only by the registry)
    pub joined_rooms: HashSet<RoomId>,
    pub last_activity_at: Timestamp,
}

impl Connection {
    pub fn new(id: ConnectionId, identity: Identity, connected_at: Timestamp) -> Self {
        Self {
            id,
            identity,
            joined_rooms: HashSet::new(),
            last_activity_at: connected_at,
        }
    }
}

/// Read-only view of a live room, used by debug endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSummary {
    pub id: RoomId,
    pub kind: RoomKind,
    pub member_count: usize,
}

/// A chat message, immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub room_id: RoomId,
    /// Always taken from the sending connection's identity
    pub sender_id: SubjectId,
    pub sender_name: String,
    pub body: MessageBody,
    pub sent_at: Timestamp,
}

impl Message {
    /// Create a new message with a freshly assigned id
    pub fn new(room_id: RoomId, sender: &Identity, body: MessageBody, sent_at: Timestamp) -> Self {
        Self {
            id: MessageId::generate(),
            room_id,
            sender_id: sender.subject_id.clone(),
            sender_name: sender.display_name.clone(),
            body,
            sent_at,
        }
    }
}

/// Ephemeral "is typing" state of one subject in one room.
///
/// Never persisted. At most one is active per (sender, room) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingSignal {
    pub room_id: RoomId,
    pub sender_id: SubjectId,
    pub expires_at: Timestamp,
}

/// Events pushed from the server to a single connection.
///
/// These are domain-level; the UI layer turns them into wire frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    Joined {
        room_id: RoomId,
    },
    Left {
        room_id: RoomId,
    },
    Message(Message),
    TypingStatus {
        room_id: RoomId,
        sender_id: SubjectId,
        is_typing: bool,
    },
    Error {
        error_kind: &'static str,
        client_message: &'static str,
    },
}
