//! UseCase: 接続切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectConnectionUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 切断された接続がどのルームのメンバーにも残らないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数ルームに参加中の接続の切断
//! - エッジケース：同じ subject の別接続は残る、二重切断

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomId, RoomRegistry};

/// 接続切断のユースケース
pub struct DisconnectConnectionUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl DisconnectConnectionUseCase {
    /// 新しい DisconnectConnectionUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// 接続切断を実行
    ///
    /// # Returns
    ///
    /// 切断時に参加していたルームの一覧
    pub async fn execute(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let rooms = self.registry.on_disconnect(connection_id).await;
        tracing::info!(
            "Connection '{}' disconnected (was in {} room(s))",
            connection_id,
            rooms.len()
        );
        rooms
    }
}
