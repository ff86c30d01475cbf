//! UseCase: 入力中通知（Presence/Typing Broadcaster の入口）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SignalTypingUseCase::start() / stop()
//!
//! ### なぜこのテストが必要か
//! - メンバー以外が入力中通知を流せてはならない
//! - 連打しても呼び出し側はエラーにならない（間引くのは配信側）
//!
//! ### どのような状況を想定しているか
//! - 正常系：通知の開始と停止
//! - 異常系：非メンバーからの通知
//! - エッジケース：間引き中の再通知、未開始の停止

use std::sync::Arc;

use crate::{
    domain::{ChatError, ConnectionId, RoomId, RoomRegistry},
    infrastructure::presence::{TypingOutcome, TypingTracker},
};

/// 入力中通知のユースケース
pub struct SignalTypingUseCase {
    registry: Arc<dyn RoomRegistry>,
    tracker: Arc<TypingTracker>,
}

impl SignalTypingUseCase {
    /// 新しい SignalTypingUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, tracker: Arc<TypingTracker>) -> Self {
        Self { registry, tracker }
    }

    /// 入力中通知を開始または更新する
    ///
    /// # Returns
    ///
    /// * `Ok(TypingOutcome)` - 配信したか、間引いたか
    /// * `Err(ChatError::NotAMember)` - ルームのメンバーでない
    pub async fn start(
        &self,
        connection_id: &ConnectionId,
        room_id: String,
    ) -> Result<TypingOutcome, ChatError> {
        let room_id = RoomId::new(room_id)?;
        if !self.registry.is_member(connection_id, &room_id).await {
            return Err(ChatError::NotAMember {
                room_id: room_id.into_string(),
            });
        }
        let identity = self.registry.identity_of(connection_id).await?;

        Ok(self.tracker.start(&identity.subject_id, &room_id).await)
    }

    /// 明示的な停止
    ///
    /// 退出後でも自分の通知は止められるよう、所属確認はしない。
    pub async fn stop(&self, connection_id: &ConnectionId, room_id: String) -> Result<bool, ChatError> {
        let room_id = RoomId::new(room_id)?;
        let identity = self.registry.identity_of(connection_id).await?;

        Ok(self.tracker.stop(&identity.subject_id, &room_id).await)
    }
}
