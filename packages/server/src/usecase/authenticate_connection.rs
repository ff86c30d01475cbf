//! UseCase: 接続の認証（Connection Gate）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AuthenticateConnectionUseCase::authenticate() / register()
//! - トークン検証と Identity の確定、Registry への登録
//!
//! ### なぜこのテストが必要か
//! - 認証前の接続からはどのイベントも処理してはならない
//! - 「誰が送ったか」は接続に紐づいた Identity だけが根拠になる
//!
//! ### どのような状況を想定しているか
//! - 正常系：有効なトークンでの接続、表示名の解決
//! - 異常系：トークンなし、期限切れ
//! - エッジケース：ディレクトリ障害時も表示名のフォールバックで接続できる
//! - エッジケース：name クレームが subject と同じ値でもディレクトリを引かない

use std::sync::Arc;

use crate::domain::{
    ChatError, ChatPolicy, Connection, ConnectionId, CredentialVerifier, EventSender, Identity,
    RoomRegistry, Timestamp, UserDirectory,
};

use super::deadline::bounded;

/// 接続認証のユースケース
pub struct AuthenticateConnectionUseCase {
    verifier: Arc<dyn CredentialVerifier>,
    users: Arc<dyn UserDirectory>,
    registry: Arc<dyn RoomRegistry>,
    policy: ChatPolicy,
}

impl AuthenticateConnectionUseCase {
    /// 新しい AuthenticateConnectionUseCase を作成
    pub fn new(
        verifier: Arc<dyn CredentialVerifier>,
        users: Arc<dyn UserDirectory>,
        registry: Arc<dyn RoomRegistry>,
        policy: ChatPolicy,
    ) -> Self {
        Self {
            verifier,
            users,
            registry,
            policy,
        }
    }

    /// トークンを検証し、接続の Identity を確定する
    ///
    /// トークンに name クレームがない場合はユーザーディレクトリの表示名を使う。
    /// ディレクトリの障害はハンドシェイクを失敗させない。
    ///
    /// # Returns
    ///
    /// * `Ok(Identity)` - 認証成功
    /// * `Err(ChatError::MissingCredential | ChatError::InvalidCredential)` - 認証失敗
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Identity, ChatError> {
        let verified = self.verifier.verify(token)?;
        let mut identity = verified.identity;

        if !verified.name_claimed {
            let lookup = bounded(
                self.policy.collaborator_timeout,
                "display name lookup",
                self.users.display_name(&identity.subject_id),
            )
            .await;
            match lookup {
                Ok(Ok(Some(name))) => identity.display_name = name,
                Ok(Ok(None)) => {}
                Ok(Err(e)) => tracing::warn!(
                    "Display name lookup for '{}' failed: {}",
                    identity.subject_id,
                    e
                ),
                Err(e) => tracing::warn!(
                    "Display name lookup for '{}' failed: {}",
                    identity.subject_id,
                    e
                ),
            }
        }

        Ok(identity)
    }

    /// 認証済みの接続を Registry に登録する
    pub async fn register(&self, identity: Identity, sender: EventSender) -> ConnectionId {
        let connection_id = ConnectionId::generate();
        let connection = Connection::new(connection_id, identity, Timestamp::now());
        self.registry.register(connection, sender).await;
        connection_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{DirectoryError, InvalidCredentialReason, SubjectId, repository::MockUserDirectory},
        infrastructure::{auth::JwtCredentialVerifier, registry::InMemoryRoomRegistry},
    };
    use tokio::sync::mpsc;

    const SECRET: &[u8] = b"gate-secret";

    fn alice() -> SubjectId {
        SubjectId::new("alice".to_string()).unwrap()
    }

    fn create_usecase(
        users: MockUserDirectory,
    ) -> (AuthenticateConnectionUseCase, Arc<InMemoryRoomRegistry>) {
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let usecase = AuthenticateConnectionUseCase::new(
            Arc::new(JwtCredentialVerifier::new(SECRET)),
            Arc::new(users),
            registry.clone(),
            ChatPolicy::default(),
        );
        (usecase, registry)
    }

    #[tokio::test]
    async fn test_authenticate_and_register_success() {
        // テスト項目: 有効なトークンで接続が登録され、Identity が紐づく
        // given (前提条件):
        let mut users = MockUserDirectory::new();
        users.expect_display_name().times(0);
        let (usecase, registry) = create_usecase(users);
        let token = JwtCredentialVerifier::new(SECRET)
            .issue(&alice(), Some("Alice"), 3600)
            .unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let identity = usecase.authenticate(Some(&token)).await.unwrap();
        let connection_id = usecase.register(identity.clone(), tx).await;

        // then (期待する結果):
        assert_eq!(identity.subject_id, alice());
        assert_eq!(identity.display_name, "Alice");
        assert_eq!(registry.count_connections().await, 1);
        assert_eq!(registry.identity_of(&connection_id).await.unwrap(), identity);
    }

    #[tokio::test]
    async fn test_display_name_resolved_from_directory() {
        // テスト項目: name クレームがない場合はディレクトリから表示名を取得する
        // given (前提条件):
        let mut users = MockUserDirectory::new();
        users
            .expect_display_name()
            .times(1)
            .returning(|_| Ok(Some("Alice Liddell".to_string())));
        let (usecase, _registry) = create_usecase(users);
        let token = JwtCredentialVerifier::new(SECRET)
            .issue(&alice(), None, 3600)
            .unwrap();

        // when (操作):
        let identity = usecase.authenticate(Some(&token)).await.unwrap();

        // then (期待する結果):
        assert_eq!(identity.display_name, "Alice Liddell");
    }

    #[tokio::test]
    async fn test_name_claim_equal_to_subject_skips_directory() {
        // テスト項目: name クレームが subject と同じ値でも、ディレクトリの表示名で上書きしない
        // given (前提条件):
        let mut users = MockUserDirectory::new();
        users.expect_display_name().times(0);
        let (usecase, _registry) = create_usecase(users);
        let token = JwtCredentialVerifier::new(SECRET)
            .issue(&alice(), Some("alice"), 3600)
            .unwrap();

        // when (操作):
        let identity = usecase.authenticate(Some(&token)).await.unwrap();

        // then (期待する結果):
        assert_eq!(identity.display_name, "alice");
    }

    #[tokio::test]
    async fn test_directory_failure_falls_back_to_subject() {
        // テスト項目: ディレクトリ障害時は subject を表示名として接続できる
        let mut users = MockUserDirectory::new();
        users
            .expect_display_name()
            .returning(|_| Err(DirectoryError::Unavailable("down".to_string())));
        let (usecase, _registry) = create_usecase(users);
        let token = JwtCredentialVerifier::new(SECRET)
            .issue(&alice(), None, 3600)
            .unwrap();

        let identity = usecase.authenticate(Some(&token)).await.unwrap();

        assert_eq!(identity.display_name, "alice");
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected() {
        // テスト項目: トークンなしの接続は MissingCredential で拒否され、登録されない
        // given (前提条件):
        let (usecase, registry) = create_usecase(MockUserDirectory::new());

        // when (操作):
        let result = usecase.authenticate(None).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), ChatError::MissingCredential);
        assert_eq!(registry.count_connections().await, 0);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        // テスト項目: 期限切れトークンは InvalidCredential で拒否される
        let (usecase, registry) = create_usecase(MockUserDirectory::new());
        let token = JwtCredentialVerifier::new(SECRET)
            .issue_at(&alice(), None, 1_000, 60)
            .unwrap();

        let result = usecase.authenticate(Some(&token)).await;

        assert_eq!(
            result.unwrap_err(),
            ChatError::InvalidCredential(InvalidCredentialReason::Expired)
        );
        assert_eq!(registry.count_connections().await, 0);
    }
}
