//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// SubjectId validation error
    #[error("SubjectId cannot be empty")]
    SubjectIdEmpty,

    /// SubjectId too long error
    #[error("SubjectId cannot exceed {max} characters (got {actual})")]
    SubjectIdTooLong { max: usize, actual: usize },

    /// SubjectId contains a reserved character
    #[error("SubjectId contains a reserved character (got: {0})")]
    SubjectIdInvalidCharacter(String),

    /// RoomId validation error
    #[error("RoomId cannot be empty")]
    RoomIdEmpty,

    /// RoomId too long error
    #[error("RoomId cannot exceed {max} characters (got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },

    /// Private RoomId does not decode to a pair of subjects
    #[error("RoomId has an invalid private room format (got: {0})")]
    RoomIdInvalidFormat(String),

    /// Private room requested between a subject and itself
    #[error("Private room needs two distinct subjects (got: {0} twice)")]
    PrivateRoomSameSubject(String),

    /// MessageBody validation error
    #[error("MessageBody cannot be empty")]
    MessageBodyEmpty,

    /// MessageBody too long error
    #[error("MessageBody cannot exceed {max} characters (got {actual})")]
    MessageBodyTooLong { max: usize, actual: usize },
}

/// Why a presented credential was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidCredentialReason {
    #[error("malformed token")]
    Malformed,
    #[error("signature mismatch")]
    SignatureMismatch,
    #[error("token expired")]
    Expired,
    #[error("invalid claims")]
    InvalidClaims,
}

/// Credential verification failures.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    /// No token, or an empty one, was presented
    #[error("missing credential")]
    Missing,

    /// A token was presented but cannot be accepted
    #[error("invalid credential: {0}")]
    Invalid(InvalidCredentialReason),
}

/// Errors related to Room Registry bookkeeping
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Connection not registered: {0}")]
    ConnectionNotFound(String),
}

/// Failures reported by the message store collaborator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("message store unavailable: {0}")]
    Unavailable(String),

    #[error("message rejected by store: {0}")]
    Rejected(String),
}

/// Failures reported by the group/user directory collaborators
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Client-visible failure taxonomy for the real-time subsystem.
///
/// `kind()` is the wire name sent to clients, `client_message()` the only text
/// they ever see. The `Display` output carries internal detail and is meant
/// for server logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("missing credential")]
    MissingCredential,

    #[error("invalid credential: {0}")]
    InvalidCredential(InvalidCredentialReason),

    #[error("not a member of room {room_id}")]
    NotAMember { room_id: String },

    #[error("validation failed: {0}")]
    ValidationError(String),

    #[error("persistence failed: {0}")]
    PersistenceError(String),

    #[error("{operation} timed out")]
    Timeout { operation: &'static str },

    #[error("unexpected error: {0}")]
    UnexpectedError(String),
}

impl ChatError {
    /// Wire name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::MissingCredential => "MissingCredential",
            ChatError::InvalidCredential(_) => "InvalidCredential",
            ChatError::NotAMember { .. } => "NotAMember",
            ChatError::ValidationError(_) => "ValidationError",
            ChatError::PersistenceError(_) => "PersistenceError",
            ChatError::Timeout { .. } => "Timeout",
            ChatError::UnexpectedError(_) => "UnexpectedError",
        }
    }

    /// Generic, non-leaking text shown to the client.
    pub fn client_message(&self) -> &'static str {
        match self {
            ChatError::MissingCredential => "Authentication required",
            ChatError::InvalidCredential(_) => "Authentication failed",
            ChatError::NotAMember { .. } => "You are not a member of this room",
            ChatError::ValidationError(_) => "The request was invalid",
            ChatError::PersistenceError(_) => "The message could not be saved",
            ChatError::Timeout { .. } => "The request timed out, please retry",
            ChatError::UnexpectedError(_) => "Something went wrong",
        }
    }
}

impl From<CredentialError> for ChatError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Missing => ChatError::MissingCredential,
            CredentialError::Invalid(reason) => ChatError::InvalidCredential(reason),
        }
    }
}

impl From<ValueObjectError> for ChatError {
    fn from(err: ValueObjectError) -> Self {
        ChatError::ValidationError(err.to_string())
    }
}

impl From<RegistryError> for ChatError {
    fn from(err: RegistryError) -> Self {
        ChatError::UnexpectedError(err.to_string())
    }
}

impl From<StoreError> for ChatError {
    fn from(err: StoreError) -> Self {
        ChatError::PersistenceError(err.to_string())
    }
}

impl From<DirectoryError> for ChatError {
    fn from(err: DirectoryError) -> Self {
        ChatError::UnexpectedError(err.to_string())
    }
}
