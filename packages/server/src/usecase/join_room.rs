//! UseCase: ルームへの参加
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - グループルームの所属確認、プライベートルームのペア確認、Registry への追加
//!
//! ### なぜこのテストが必要か
//! - 所属していないグループのメッセージを受け取れてはならない
//! - join は冪等でなければならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：所属グループへの参加、自分を含むプライベートルームへの参加
//! - 異常系：非所属グループ、他人同士のプライベートルーム
//! - エッジケース：所属確認のタイムアウト、二重 join

use std::sync::Arc;

use crate::domain::{
    ChatError, ChatPolicy, ConnectionId, MembershipDirectory, OutboundEvent, RoomId, RoomKind,
    RoomRegistry,
};

use super::deadline::bounded;

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    registry: Arc<dyn RoomRegistry>,
    membership: Arc<dyn MembershipDirectory>,
    policy: ChatPolicy,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        membership: Arc<dyn MembershipDirectory>,
        policy: ChatPolicy,
    ) -> Self {
        Self {
            registry,
            membership,
            policy,
        }
    }

    /// ルーム参加を実行
    ///
    /// 成功すると参加した接続にだけ `joined` を送る（参加済みでも同様）。
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 参加する接続
    /// * `room_id` - クライアントが指定したルーム ID
    ///
    /// # Returns
    ///
    /// * `Ok(RoomId)` - 正規化されたルーム ID
    /// * `Err(ChatError)` - NotAMember / ValidationError / Timeout など
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: String,
    ) -> Result<RoomId, ChatError> {
        let room_id = RoomId::new(room_id)?;
        let identity = self.registry.identity_of(connection_id).await?;

        let allowed = match room_id.kind() {
            RoomKind::Group => bounded(
                self.policy.collaborator_timeout,
                "membership check",
                self.membership
                    .is_member(&identity.subject_id, room_id.as_str()),
            )
            .await??,
            RoomKind::Private => room_id
                .private_pair()
                .is_some_and(|(a, b)| a == identity.subject_id || b == identity.subject_id),
        };
        if !allowed {
            return Err(ChatError::NotAMember {
                room_id: room_id.into_string(),
            });
        }

        if self.registry.join(connection_id, &room_id).await? {
            tracing::info!(
                "Connection '{}' ({}) joined '{}'",
                connection_id,
                identity.subject_id,
                room_id
            );
        }
        self.registry
            .send_to(
                connection_id,
                OutboundEvent::Joined {
                    room_id: room_id.clone(),
                },
            )
            .await;

        Ok(room_id)
    }
}
