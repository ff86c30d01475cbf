//! Typing presence tracker.
//!
//! Keeps at most one active [`TypingSignal`] per (sender, room) pair. Each
//! signal owns a cancellable expiry task; a refresh replaces the task, an
//! explicit stop cancels it. Whichever of stop or expiry comes first emits the
//! single `isTyping = false` for that signal.
//!
//! Outbound `isTyping = true` fan-out is rate-limited per pair: refreshes
//! inside the debounce window extend the signal without re-broadcasting.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{Instant, sleep},
};

use crate::domain::{OutboundEvent, RoomId, RoomRegistry, SubjectId, Timestamp, TypingSignal};

type TypingKey = (SubjectId, RoomId);

struct ActiveSignal {
    signal: TypingSignal,
    generation: u64,
    last_broadcast: Instant,
    expiry: JoinHandle<()>,
}

type SignalMap = Arc<Mutex<HashMap<TypingKey, ActiveSignal>>>;

/// Result of a typing refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingOutcome {
    /// `isTyping = true` was fanned out to the room
    Broadcast,
    /// Still inside the debounce window; only the expiry was extended
    Debounced,
}

pub struct TypingTracker {
    registry: Arc<dyn RoomRegistry>,
    debounce: Duration,
    ttl: Duration,
    signals: SignalMap,
    next_generation: AtomicU64,
}

impl TypingTracker {
    pub fn new(registry: Arc<dyn RoomRegistry>, debounce: Duration, ttl: Duration) -> Self {
        Self {
            registry,
            debounce,
            ttl,
            signals: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Start or refresh the typing signal of `sender` in `room_id`.
    pub async fn start(&self, sender: &SubjectId, room_id: &RoomId) -> TypingOutcome {
        let key = (sender.clone(), room_id.clone());
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let now = Instant::now();
        let ttl_millis = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);

        let mut signals = self.signals.lock().await;
        let previous_broadcast = signals.get(&key).map(|active| active.last_broadcast);
        let outcome = match previous_broadcast {
            Some(at) if now.duration_since(at) < self.debounce => TypingOutcome::Debounced,
            _ => TypingOutcome::Broadcast,
        };

        let expiry = tokio::spawn(expire_after(
            self.ttl,
            self.signals.clone(),
            self.registry.clone(),
            key.clone(),
            generation,
        ));
        let active = ActiveSignal {
            signal: TypingSignal {
                room_id: room_id.clone(),
                sender_id: sender.clone(),
                expires_at: Timestamp::new(Timestamp::now().value().saturating_add(ttl_millis)),
            },
            generation,
            last_broadcast: match (outcome, previous_broadcast) {
                (TypingOutcome::Debounced, Some(at)) => at,
                _ => now,
            },
            expiry,
        };
        if let Some(replaced) = signals.insert(key, active) {
            replaced.expiry.abort();
        }

        if outcome == TypingOutcome::Broadcast {
            self.registry
                .broadcast(room_id, typing_status(room_id, sender, true))
                .await;
        }
        outcome
    }

    /// Explicit stop. Returns `false` when no signal was active.
    pub async fn stop(&self, sender: &SubjectId, room_id: &RoomId) -> bool {
        let key = (sender.clone(), room_id.clone());
        let mut signals = self.signals.lock().await;
        let Some(active) = signals.remove(&key) else {
            return false;
        };
        active.expiry.abort();
        self.registry
            .broadcast(room_id, typing_status(room_id, sender, false))
            .await;
        true
    }

    /// Currently active signal for a pair, if any.
    pub async fn active_signal(&self, sender: &SubjectId, room_id: &RoomId) -> Option<TypingSignal> {
        let signals = self.signals.lock().await;
        signals
            .get(&(sender.clone(), room_id.clone()))
            .map(|active| active.signal.clone())
    }
}

impl Drop for TypingTracker {
    fn drop(&mut self) {
        if let Ok(signals) = self.signals.try_lock() {
            for active in signals.values() {
                active.expiry.abort();
            }
        }
    }
}

async fn expire_after(
    ttl: Duration,
    signals: SignalMap,
    registry: Arc<dyn RoomRegistry>,
    key: TypingKey,
    generation: u64,
) {
    sleep(ttl).await;

    let mut signals = signals.lock().await;
    let current = signals.get(&key).map(|active| active.generation);
    if current != Some(generation) {
        return;
    }
    signals.remove(&key);

    let (sender, room_id) = key;
    tracing::debug!("Typing signal of '{}' in '{}' expired", sender, room_id);
    registry
        .broadcast(&room_id, typing_status(&room_id, &sender, false))
        .await;
}

fn typing_status(room_id: &RoomId, sender: &SubjectId, is_typing: bool) -> OutboundEvent {
    OutboundEvent::TypingStatus {
        room_id: room_id.clone(),
        sender_id: sender.clone(),
        is_typing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Connection, ConnectionId, Identity},
        infrastructure::registry::InMemoryRoomRegistry,
    };
    use tokio::sync::mpsc;

    const DEBOUNCE: Duration = Duration::from_millis(500);
    const TTL: Duration = Duration::from_millis(3000);

    fn subject(id: &str) -> SubjectId {
        SubjectId::new(id.to_string()).unwrap()
    }

    fn room() -> RoomId {
        RoomId::new("group-1".to_string()).unwrap()
    }

    /// Registry with one watcher joined to `group-1`
    async fn setup() -> (
        TypingTracker,
        mpsc::UnboundedReceiver<OutboundEvent>,
    ) {
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let watcher = ConnectionId::generate();
        let identity = Identity::new(
            subject("watcher"),
            "watcher".to_string(),
            Timestamp::new(0),
            Timestamp::new(i64::MAX),
        );
        registry
            .register(Connection::new(watcher, identity, Timestamp::new(0)), tx)
            .await;
        registry.join(&watcher, &room()).await.unwrap();
        (TypingTracker::new(registry, DEBOUNCE, TTL), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<OutboundEvent>) -> Vec<bool> {
        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let OutboundEvent::TypingStatus { is_typing, .. } = event {
                seen.push(is_typing);
            }
        }
        seen
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_one_broadcast() {
        // テスト項目: 短時間の連続入力はウィンドウ内で 1 回だけ配信される
        // given (前提条件):
        let (tracker, mut rx) = setup().await;
        let alice = subject("alice");

        // when (操作):
        let first = tracker.start(&alice, &room()).await;
        tokio::time::advance(Duration::from_millis(100)).await;
        let second = tracker.start(&alice, &room()).await;
        tokio::time::advance(Duration::from_millis(100)).await;
        let third = tracker.start(&alice, &room()).await;

        // then (期待する結果):
        assert_eq!(first, TypingOutcome::Broadcast);
        assert_eq!(second, TypingOutcome::Debounced);
        assert_eq!(third, TypingOutcome::Debounced);
        assert_eq!(drain(&mut rx), vec![true]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_after_window_broadcasts_again() {
        // テスト項目: ウィンドウ経過後の入力は再度配信される
        let (tracker, mut rx) = setup().await;
        let alice = subject("alice");

        tracker.start(&alice, &room()).await;
        tokio::time::advance(DEBOUNCE + Duration::from_millis(1)).await;
        let outcome = tracker.start(&alice, &room()).await;

        assert_eq!(outcome, TypingOutcome::Broadcast);
        assert_eq!(drain(&mut rx), vec![true, true]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_emits_exactly_one_stop() {
        // テスト項目: 更新がないまま期限が切れると isTyping=false が 1 回だけ配信される
        // given (前提条件):
        let (tracker, mut rx) = setup().await;
        let alice = subject("alice");
        tracker.start(&alice, &room()).await;

        // when (操作):
        tokio::time::sleep(TTL * 3).await;
        settle().await;

        // then (期待する結果):
        assert_eq!(drain(&mut rx), vec![true, false]);
        assert!(tracker.active_signal(&alice, &room()).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_postpones_expiry() {
        // テスト項目: 更新されたシグナルは古いタイマーで終了しない
        let (tracker, mut rx) = setup().await;
        let alice = subject("alice");

        tracker.start(&alice, &room()).await;
        tokio::time::sleep(TTL - Duration::from_millis(100)).await;
        tracker.start(&alice, &room()).await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        settle().await;

        // 最初のタイマーの期限は過ぎているが、シグナルはまだ有効
        assert!(tracker.active_signal(&alice, &room()).await.is_some());
        assert_eq!(drain(&mut rx), vec![true, true]);

        tokio::time::sleep(TTL).await;
        settle().await;
        assert_eq!(drain(&mut rx), vec![false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_stop_wins_over_expiry() {
        // テスト項目: 明示的な停止の後、期限切れで重複して false が配信されない
        // given (前提条件):
        let (tracker, mut rx) = setup().await;
        let alice = subject("alice");
        tracker.start(&alice, &room()).await;

        // when (操作):
        let stopped = tracker.stop(&alice, &room()).await;
        tokio::time::sleep(TTL * 2).await;
        settle().await;

        // then (期待する結果):
        assert!(stopped);
        assert_eq!(drain(&mut rx), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_without_signal_is_silent() {
        // テスト項目: アクティブなシグナルがない停止は何も配信しない
        let (tracker, mut rx) = setup().await;
        assert!(!tracker.stop(&subject("alice"), &room()).await);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_signals_are_per_sender() {
        // テスト項目: 送信者ごとに独立してデバウンスされる
        let (tracker, mut rx) = setup().await;

        tracker.start(&subject("alice"), &room()).await;
        let bob = tracker.start(&subject("bob"), &room()).await;

        assert_eq!(bob, TypingOutcome::Broadcast);
        assert_eq!(drain(&mut rx), vec![true, true]);
    }
}
