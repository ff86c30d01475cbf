//! InMemory Room Registry 実装
//!
//! ドメイン層が定義する RoomRegistry trait の具体的な実装。
//! 接続とルームの両方を 1 つの Mutex の内側で管理します。
//!
//! membership の変更（join / leave / on_disconnect）とブロードキャスト時の
//! スナップショット取得は同じロックで直列化されるため、途中状態の join に
//! 配信してしまうことも、完了済みの join を取りこぼすこともありません。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Connection, ConnectionId, EventSender, Identity, OutboundEvent, RegistryError, RoomId,
    RoomKind, RoomRegistry, RoomSummary, Timestamp,
};

/// 接続ごとの情報（WebSocket への送信チャンネルを含む）
struct ConnectionEntry {
    connection: Connection,
    sender: EventSender,
}

/// ルームと現在のメンバー
struct RoomEntry {
    kind: RoomKind,
    members: HashSet<ConnectionId>,
}

#[derive(Default)]
struct RegistryState {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    rooms: HashMap<RoomId, RoomEntry>,
}

impl RegistryState {
    fn remove_member(&mut self, connection_id: &ConnectionId, room_id: &RoomId) -> bool {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return false;
        };
        let removed = room.members.remove(connection_id);
        if room.members.is_empty() {
            self.rooms.remove(room_id);
            tracing::debug!("Room '{}' evicted (no members left)", room_id);
        }
        removed
    }
}

/// インメモリ Room Registry 実装
///
/// HashMap をインメモリストアとして使用する実装。
/// ドメイン層の RoomRegistry trait を実装します（依存性の逆転）。
#[derive(Default)]
pub struct InMemoryRoomRegistry {
    state: Mutex<RegistryState>,
}

impl InMemoryRoomRegistry {
    /// 新しい InMemoryRoomRegistry を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn register(&self, connection: Connection, sender: EventSender) {
        let mut state = self.state.lock().await;
        let id = connection.id;
        state
            .connections
            .insert(id, ConnectionEntry { connection, sender });
    }

    async fn identity_of(&self, connection_id: &ConnectionId) -> Result<Identity, RegistryError> {
        let state = self.state.lock().await;
        state
            .connections
            .get(connection_id)
            .map(|entry| entry.connection.identity.clone())
            .ok_or_else(|| RegistryError::ConnectionNotFound(connection_id.to_string()))
    }

    async fn touch(&self, connection_id: &ConnectionId, at: Timestamp) {
        let mut state = self.state.lock().await;
        if let Some(entry) = state.connections.get_mut(connection_id) {
            entry.connection.last_activity_at = at;
        }
    }

    async fn join(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<bool, RegistryError> {
        let mut state = self.state.lock().await;
        let entry = state
            .connections
            .get_mut(connection_id)
            .ok_or_else(|| RegistryError::ConnectionNotFound(connection_id.to_string()))?;
        if !entry.connection.joined_rooms.insert(room_id.clone()) {
            return Ok(false);
        }

        state
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| RoomEntry {
                kind: room_id.kind(),
                members: HashSet::new(),
            })
            .members
            .insert(*connection_id);
        Ok(true)
    }

    async fn leave(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool {
        let mut state = self.state.lock().await;
        if let Some(entry) = state.connections.get_mut(connection_id) {
            entry.connection.joined_rooms.remove(room_id);
        }
        state.remove_member(connection_id, room_id)
    }

    async fn members_of(&self, room_id: &RoomId) -> HashSet<ConnectionId> {
        let state = self.state.lock().await;
        state
            .rooms
            .get(room_id)
            .map(|room| room.members.clone())
            .unwrap_or_default()
    }

    async fn is_member(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool {
        let state = self.state.lock().await;
        state
            .rooms
            .get(room_id)
            .is_some_and(|room| room.members.contains(connection_id))
    }

    async fn on_disconnect(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let mut state = self.state.lock().await;
        let Some(entry) = state.connections.remove(connection_id) else {
            return Vec::new();
        };

        let mut rooms: Vec<RoomId> = entry.connection.joined_rooms.into_iter().collect();
        rooms.sort();
        for room_id in &rooms {
            state.remove_member(connection_id, room_id);
        }
        rooms
    }

    async fn broadcast(&self, room_id: &RoomId, event: OutboundEvent) -> usize {
        let state = self.state.lock().await;
        let Some(room) = state.rooms.get(room_id) else {
            return 0;
        };

        let mut delivered = 0;
        for member in &room.members {
            match state.connections.get(member) {
                Some(entry) if entry.sender.send(event.clone()).is_ok() => delivered += 1,
                _ => tracing::warn!("Failed to deliver event to connection '{}'", member),
            }
        }
        delivered
    }

    async fn send_to(&self, connection_id: &ConnectionId, event: OutboundEvent) -> bool {
        let state = self.state.lock().await;
        state
            .connections
            .get(connection_id)
            .is_some_and(|entry| entry.sender.send(event).is_ok())
    }

    async fn room_summaries(&self) -> Vec<RoomSummary> {
        let state = self.state.lock().await;
        let mut summaries: Vec<RoomSummary> = state
            .rooms
            .iter()
            .map(|(id, room)| RoomSummary {
                id: id.clone(),
                kind: room.kind,
                member_count: room.members.len(),
            })
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    async fn count_connections(&self) -> usize {
        let state = self.state.lock().await;
        state.connections.len()
    }
}
