//! Traits for the Room Registry and for external collaborators.
//!
//! UseCases depend on these traits only; concrete implementations live in the
//! infrastructure layer.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use super::{
    entity::{Connection, Identity, Message, OutboundEvent, RoomSummary, VerifiedCredential},
    error::{CredentialError, DirectoryError, RegistryError, StoreError},
    value_object::{ConnectionId, MessageId, RoomId, SubjectId, Timestamp},
};

/// Channel carrying events to one connection's writer task
pub type EventSender = UnboundedSender<OutboundEvent>;

/// Room Registry: the single owner of connections and room membership.
///
/// Every mutation and every snapshot goes through one serialization point, so
/// a broadcast never observes a half-applied join or leave.
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// Register a freshly authenticated connection with its outbound channel.
    async fn register(&self, connection: Connection, sender: EventSender);

    /// Identity attached to a connection at handshake time.
    async fn identity_of(&self, connection_id: &ConnectionId) -> Result<Identity, RegistryError>;

    /// Record inbound activity on a connection.
    async fn touch(&self, connection_id: &ConnectionId, at: Timestamp);

    /// Add a connection to a room, creating the room lazily.
    ///
    /// Returns `Ok(false)` when the connection was already a member.
    async fn join(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<bool, RegistryError>;

    /// Remove a connection from a room, evicting the room once empty.
    ///
    /// Returns `false` when there was nothing to remove.
    async fn leave(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool;

    /// Snapshot of the connections currently in a room.
    async fn members_of(&self, room_id: &RoomId) -> HashSet<ConnectionId>;

    async fn is_member(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool;

    /// Drop a connection and its memberships. Returns the rooms it was in.
    async fn on_disconnect(&self, connection_id: &ConnectionId) -> Vec<RoomId>;

    /// Deliver an event to every current member of a room.
    ///
    /// Returns the number of connections the event was handed to.
    async fn broadcast(&self, room_id: &RoomId, event: OutboundEvent) -> usize;

    /// Deliver an event to a single connection. Absent connections are a no-op.
    async fn send_to(&self, connection_id: &ConnectionId, event: OutboundEvent) -> bool;

    async fn room_summaries(&self) -> Vec<RoomSummary>;

    async fn count_connections(&self) -> usize;
}

/// Turns a bearer token into an [`Identity`].
///
/// Implementations are pure: same token, secret and clock give the same result.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, token: Option<&str>) -> Result<VerifiedCredential, CredentialError>;
}

/// External group membership lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipDirectory: Send + Sync {
    async fn is_member(&self, subject_id: &SubjectId, group_id: &str)
    -> Result<bool, DirectoryError>;
}

/// External message persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn save(&self, message: &Message) -> Result<MessageId, StoreError>;
}

/// External user directory for display names
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn display_name(&self, subject_id: &SubjectId)
    -> Result<Option<String>, DirectoryError>;
}
