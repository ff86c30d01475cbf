//! Domain layer for the real-time messaging subsystem.
//!
//! This module contains business rules that are independent of
//! transport, wire DTOs and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod policy;
pub mod repository;
pub mod value_object;

pub use entity::{
    Connection, Identity, Message, OutboundEvent, RoomSummary, TypingSignal, VerifiedCredential,
};
pub use error::{
    ChatError, CredentialError, DirectoryError, InvalidCredentialReason, RegistryError,
    StoreError, ValueObjectError,
};
pub use policy::ChatPolicy;
pub use repository::{
    CredentialVerifier, EventSender, MembershipDirectory, MessageStore, RoomRegistry,
    UserDirectory,
};
pub use value_object::{
    ConnectionId, MessageBody, MessageId, RoomId, RoomKind, SubjectId, Timestamp,
};
