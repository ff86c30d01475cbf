//! UseCase: メッセージ送信処理（Message Router）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 所属確認 → メッセージ作成 → 永続化 → ブロードキャストの順序
//!
//! ### なぜこのテストが必要か
//! - 永続化に失敗したメッセージは誰にも配信してはならない
//! - 送信者は接続に紐づいた Identity からのみ決まる
//! - N 人のメンバーには N 回だけ配信され、メンバー以外には届かない
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージ送信とブロードキャスト（同一 subject の別接続を含む）
//! - 異常系：非メンバーからの送信、永続化失敗、永続化タイムアウト
//! - エッジケース：空白だけの本文、最大長ちょうどの本文

use std::sync::Arc;

use crate::domain::{
    ChatError, ChatPolicy, ConnectionId, Message, MessageBody, MessageId, MessageStore,
    OutboundEvent, RoomId, RoomRegistry, Timestamp,
};

use super::deadline::bounded;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    registry: Arc<dyn RoomRegistry>,
    /// 外部の永続化先
    store: Arc<dyn MessageStore>,
    policy: ChatPolicy,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        store: Arc<dyn MessageStore>,
        policy: ChatPolicy,
    ) -> Self {
        Self {
            registry,
            store,
            policy,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 送信元の接続（送信者はこの接続の Identity で決まる）
    /// * `room_id` - 宛先ルーム
    /// * `body` - メッセージ本文（前後の空白は取り除かれる）
    ///
    /// # Returns
    ///
    /// * `Ok(MessageId)` - 永続化されたメッセージの ID
    /// * `Err(ChatError)` - 送信失敗（この場合は誰にも配信されない）
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: String,
        body: String,
    ) -> Result<MessageId, ChatError> {
        let room_id = RoomId::new(room_id)?;
        let body = MessageBody::new(body, self.policy.max_message_length)?;

        if !self.registry.is_member(connection_id, &room_id).await {
            return Err(ChatError::NotAMember {
                room_id: room_id.into_string(),
            });
        }
        let identity = self.registry.identity_of(connection_id).await?;

        let mut message = Message::new(room_id.clone(), &identity, body, Timestamp::now());
        let message_id = bounded(
            self.policy.collaborator_timeout,
            "message persistence",
            self.store.save(&message),
        )
        .await??;
        message.id = message_id;

        let delivered = self
            .registry
            .broadcast(&room_id, OutboundEvent::Message(message))
            .await;
        tracing::debug!(
            "Message '{}' from '{}' delivered to {} connection(s) in '{}'",
            message_id,
            identity.subject_id,
            delivered,
            room_id
        );

        Ok(message_id)
    }
}
