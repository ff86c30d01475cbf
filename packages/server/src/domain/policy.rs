//! Tunable policy values shared by the use cases.

use std::time::Duration;

/// Default maximum message body length in characters
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 2000;

/// Default outbound typing fan-out window
pub const DEFAULT_TYPING_DEBOUNCE: Duration = Duration::from_millis(500);

/// Default lifetime of a typing signal without refresh
pub const DEFAULT_TYPING_TTL: Duration = Duration::from_millis(5000);

/// Default bound on calls to external collaborators
pub const DEFAULT_COLLABORATOR_TIMEOUT: Duration = Duration::from_millis(5000);

/// Policy values injected into use cases at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatPolicy {
    pub max_message_length: usize,
    pub typing_debounce: Duration,
    pub typing_ttl: Duration,
    pub collaborator_timeout: Duration,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            typing_debounce: DEFAULT_TYPING_DEBOUNCE,
            typing_ttl: DEFAULT_TYPING_TTL,
            collaborator_timeout: DEFAULT_COLLABORATOR_TIMEOUT,
        }
    }
}
