//! InMemory MessageStore 実装

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Message, MessageId, MessageStore, RoomId, StoreError};

/// Default maximum number of messages kept in memory
pub const DEFAULT_MESSAGE_CAPACITY: usize = 10_000;

/// Keeps saved messages in insertion order.
///
/// Rejects saves once `capacity` messages are stored, which lets the server
/// exercise its persistence-failure path without a real database.
pub struct InMemoryMessageStore {
    messages: Mutex<Vec<Message>>,
    capacity: usize,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MESSAGE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Messages saved for a room, oldest first.
    pub async fn history(&self, room_id: &RoomId) -> Vec<Message> {
        let messages = self.messages.lock().await;
        messages
            .iter()
            .filter(|m| &m.room_id == room_id)
            .cloned()
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.messages.lock().await.len()
    }
}

impl Default for InMemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn save(&self, message: &Message) -> Result<MessageId, StoreError> {
        let mut messages = self.messages.lock().await;
        if messages.len() >= self.capacity {
            return Err(StoreError::Rejected(format!(
                "capacity of {} messages reached",
                self.capacity
            )));
        }
        messages.push(message.clone());
        Ok(message.id)
    }
}
