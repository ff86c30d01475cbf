//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::error::ValueObjectError;

/// Maximum length of a subject identifier.
pub const MAX_SUBJECT_ID_LENGTH: usize = 128;

/// Maximum length of a room identifier.
pub const MAX_ROOM_ID_LENGTH: usize = 300;

/// Prefix that marks a private (two-party) room identifier.
pub const PRIVATE_ROOM_PREFIX: &str = "private:";

/// Authenticated user identifier value object.
///
/// Taken from the `sub` claim of a verified token. The `:` character is
/// reserved as the private room separator and is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectId(String);

impl SubjectId {
    /// Create a new SubjectId.
    ///
    /// # Arguments
    ///
    /// * `id` - The subject identifier string
    ///
    /// # Returns
    ///
    /// A Result containing the SubjectId or an error if validation fails
    pub fn new(id: String) -> Result<Self, ValueObjectError> {
        if id.is_empty() {
            return Err(ValueObjectError::SubjectIdEmpty);
        }
        let len = id.chars().count();
        if len > MAX_SUBJECT_ID_LENGTH {
            return Err(ValueObjectError::SubjectIdTooLong {
                max: MAX_SUBJECT_ID_LENGTH,
                actual: len,
            });
        }
        if id.contains(':') || id.chars().any(char::is_whitespace) {
            return Err(ValueObjectError::SubjectIdInvalidCharacter(id));
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for SubjectId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-assigned identifier of one live socket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh random connection id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of a room, derived from its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    Group,
    Private,
}

impl fmt::Display for RoomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomKind::Group => write!(f, "group"),
            RoomKind::Private => write!(f, "private"),
        }
    }
}

/// Room identifier value object.
///
/// Either a group room (`<groupId>`) or a private room
/// (`private:<subjectA>:<subjectB>`). Private identifiers are stored with the
/// pair sorted, so both participants always address the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    /// Create a new RoomId.
    ///
    /// # Arguments
    ///
    /// * `id` - The room identifier string
    ///
    /// # Returns
    ///
    /// A Result containing the (canonical) RoomId or an error if validation fails
    pub fn new(id: String) -> Result<Self, ValueObjectError> {
        if id.trim().is_empty() {
            return Err(ValueObjectError::RoomIdEmpty);
        }
        let len = id.chars().count();
        if len > MAX_ROOM_ID_LENGTH {
            return Err(ValueObjectError::RoomIdTooLong {
                max: MAX_ROOM_ID_LENGTH,
                actual: len,
            });
        }
        match id.strip_prefix(PRIVATE_ROOM_PREFIX) {
            Some(pair) => {
                let (first, second) = pair
                    .split_once(':')
                    .ok_or_else(|| ValueObjectError::RoomIdInvalidFormat(id.clone()))?;
                let first = SubjectId::new(first.to_string())
                    .map_err(|_| ValueObjectError::RoomIdInvalidFormat(id.clone()))?;
                let second = SubjectId::new(second.to_string())
                    .map_err(|_| ValueObjectError::RoomIdInvalidFormat(id.clone()))?;
                Self::private(&first, &second)
            }
            None => Ok(Self(id)),
        }
    }

    /// Derive the private room shared by two subjects.
    ///
    /// `private(a, b) == private(b, a)` for every pair.
    pub fn private(a: &SubjectId, b: &SubjectId) -> Result<Self, ValueObjectError> {
        if a == b {
            return Err(ValueObjectError::PrivateRoomSameSubject(a.to_string()));
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self(format!("{PRIVATE_ROOM_PREFIX}{low}:{high}")))
    }

    pub fn kind(&self) -> RoomKind {
        if self.0.starts_with(PRIVATE_ROOM_PREFIX) {
            RoomKind::Private
        } else {
            RoomKind::Group
        }
    }

    /// Decode the two participants of a private room.
    ///
    /// Returns `None` for group rooms.
    pub fn private_pair(&self) -> Option<(SubjectId, SubjectId)> {
        let pair = self.0.strip_prefix(PRIVATE_ROOM_PREFIX)?;
        let (first, second) = pair.split_once(':')?;
        Some((
            SubjectId::new(first.to_string()).ok()?,
            SubjectId::new(second.to_string()).ok()?,
        ))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message identifier, assigned before broadcast so clients can deduplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message body value object.
///
/// Stored trimmed. The length limit is a policy value supplied by the caller
/// and counted in characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody(String);

impl MessageBody {
    /// Create a new MessageBody.
    ///
    /// # Arguments
    ///
    /// * `body` - The raw message body
    /// * `max_length` - Maximum number of characters after trimming
    ///
    /// # Returns
    ///
    /// A Result containing the MessageBody or an error if validation fails
    pub fn new(body: String, max_length: usize) -> Result<Self, ValueObjectError> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::MessageBodyEmpty);
        }
        let len = trimmed.chars().count();
        if len > max_length {
            return Err(ValueObjectError::MessageBodyTooLong {
                max: max_length,
                actual: len,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MessageBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp value object.
///
/// Represents a Unix timestamp in milliseconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a new Timestamp from Unix milliseconds.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Create a Timestamp from Unix seconds.
    pub fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Current time.
    pub fn now() -> Self {
        Self(roomcast_shared::time::now_millis())
    }

    /// Get the inner i64 value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&roomcast_shared::time::millis_to_rfc3339(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(id: &str) -> SubjectId {
        SubjectId::new(id.to_string()).unwrap()
    }

    #[test]
    fn test_subject_id_new_success() {
        // テスト項目: 有効なサブジェクト ID を作成できる
        // given (前提条件):
        let id = "alice".to_string();

        // when (操作):
        let result = SubjectId::new(id);

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(result.unwrap().as_str(), "alice");
    }

    #[test]
    fn test_subject_id_rejects_separator() {
        // テスト項目: ":" を含むサブジェクト ID は作成できない
        // when (操作):
        let result = SubjectId::new("al:ice".to_string());

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            ValueObjectError::SubjectIdInvalidCharacter("al:ice".to_string())
        );
    }

    #[test]
    fn test_subject_id_new_empty_fails() {
        // テスト項目: 空のサブジェクト ID は作成できない
        let result = SubjectId::new(String::new());
        assert_eq!(result.unwrap_err(), ValueObjectError::SubjectIdEmpty);
    }

    #[test]
    fn test_room_id_group() {
        // テスト項目: 通常の ID はグループルームとして扱われる
        // when (操作):
        let room_id = RoomId::new("group-1".to_string()).unwrap();

        // then (期待する結果):
        assert_eq!(room_id.kind(), RoomKind::Group);
        assert_eq!(room_id.as_str(), "group-1");
        assert!(room_id.private_pair().is_none());
    }

    #[test]
    fn test_room_id_new_empty_fails() {
        // テスト項目: 空白のみのルーム ID は作成できない
        let result = RoomId::new("   ".to_string());
        assert_eq!(result.unwrap_err(), ValueObjectError::RoomIdEmpty);
    }

    #[test]
    fn test_private_room_id_is_symmetric() {
        // テスト項目: private(A, B) と private(B, A) は同じルームになる
        // given (前提条件):
        let alice = subject("alice");
        let bob = subject("bob");

        // when (操作):
        let ab = RoomId::private(&alice, &bob).unwrap();
        let ba = RoomId::private(&bob, &alice).unwrap();

        // then (期待する結果):
        assert_eq!(ab, ba);
        assert_eq!(ab.as_str(), "private:alice:bob");
        assert_eq!(ab.kind(), RoomKind::Private);
    }

    #[test]
    fn test_private_room_id_parse_is_canonical() {
        // テスト項目: 逆順で指定されたプライベートルーム ID も正規化される
        // when (操作):
        let parsed = RoomId::new("private:bob:alice".to_string()).unwrap();

        // then (期待する結果):
        assert_eq!(parsed.as_str(), "private:alice:bob");
        assert_eq!(parsed.private_pair(), Some((subject("alice"), subject("bob"))));
    }

    #[test]
    fn test_private_room_id_rejects_same_subject() {
        // テスト項目: 同一人物同士のプライベートルームは作成できない
        let alice = subject("alice");
        let result = RoomId::private(&alice, &alice);
        assert_eq!(
            result.unwrap_err(),
            ValueObjectError::PrivateRoomSameSubject("alice".to_string())
        );
    }

    #[test]
    fn test_private_room_id_rejects_malformed_pair() {
        // テスト項目: 相手が欠けたプライベートルーム ID はエラーになる
        let result = RoomId::new("private:alice".to_string());
        assert_eq!(
            result.unwrap_err(),
            ValueObjectError::RoomIdInvalidFormat("private:alice".to_string())
        );
    }

    #[test]
    fn test_message_body_is_trimmed() {
        // テスト項目: メッセージ本文は前後の空白が除去される
        let body = MessageBody::new("  hello  ".to_string(), 10).unwrap();
        assert_eq!(body.as_str(), "hello");
    }

    #[test]
    fn test_message_body_whitespace_only_fails() {
        // テスト項目: 空白のみの本文は空として扱われる
        let result = MessageBody::new(" \n\t ".to_string(), 10);
        assert_eq!(result.unwrap_err(), ValueObjectError::MessageBodyEmpty);
    }

    #[test]
    fn test_message_body_too_long_fails() {
        // テスト項目: 上限を超える本文は作成できない（文字数で数える）
        // given (前提条件):
        let body = "あ".repeat(6);

        // when (操作):
        let result = MessageBody::new(body, 5);

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            ValueObjectError::MessageBodyTooLong { max: 5, actual: 6 }
        );
    }

    #[test]
    fn test_timestamp_from_secs() {
        // テスト項目: 秒からミリ秒のタイムスタンプを作成できる
        assert_eq!(Timestamp::from_secs(2).value(), 2000);
        assert!(Timestamp::new(1000) < Timestamp::new(2000));
    }

    #[test]
    fn test_timestamp_display_is_rfc3339() {
        // テスト項目: タイムスタンプはログ上 RFC 3339 形式で表示される
        assert_eq!(Timestamp::new(1_500).to_string(), "1970-01-01T00:00:01.500Z");
    }

    #[test]
    fn test_connection_ids_are_unique() {
        // テスト項目: 接続 ID は毎回異なる
        assert_ne!(ConnectionId::generate(), ConnectionId::generate());
        assert_ne!(MessageId::generate(), MessageId::generate());
    }
}
