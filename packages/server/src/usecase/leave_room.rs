//! UseCase: ルームからの退出

use std::sync::Arc;

use crate::domain::{ChatError, ConnectionId, OutboundEvent, RoomId, RoomRegistry};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// ルーム退出を実行
    ///
    /// 参加していないルームからの退出も成功扱いにする。
    /// 退出した接続には `left` を送る。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: String,
    ) -> Result<RoomId, ChatError> {
        let room_id = RoomId::new(room_id)?;

        if self.registry.leave(connection_id, &room_id).await {
            tracing::info!("Connection '{}' left '{}'", connection_id, room_id);
        }
        self.registry
            .send_to(
                connection_id,
                OutboundEvent::Left {
                    room_id: room_id.clone(),
                },
            )
            .await;

        Ok(room_id)
    }
}
