//! In-process synchronization store.

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use augmenter_protocols::{InputSnapshot, StoreError, SyncStore, WriteOutcome};

use crate::NOTIFY_CAPACITY;

/// Process-local store. Every context holding a clone of the same `Arc`
/// sees the same value.
pub struct MemoryStore {
    id: String,
    state: RwLock<InputSnapshot>,
    sender: broadcast::Sender<InputSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_id("memory")
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        let (sender, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self {
            id: id.into(),
            state: RwLock::new(InputSnapshot::disconnected()),
            sender,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SyncStore for MemoryStore {
    fn id(&self) -> &str {
        &self.id
    }

    async fn write(&self, snapshot: InputSnapshot) -> Result<WriteOutcome, StoreError> {
        let stamped = {
            let mut state = self.state.write();
            if state.same_value(&snapshot) {
                debug!(store = %self.id, "Write suppressed, value unchanged");
                return Ok(WriteOutcome::Unchanged);
            }
            let stamped = snapshot.stamped(state.observed_at);
            *state = stamped.clone();
            stamped
        };

        debug!(
            store = %self.id,
            connected = stamped.connected,
            chars = stamped.char_count(),
            "Snapshot written"
        );
        // No subscribers is not an error.
        let _ = self.sender.send(stamped.clone());
        Ok(WriteOutcome::Written(stamped))
    }

    async fn read(&self) -> Result<InputSnapshot, StoreError> {
        Ok(self.state.read().clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<InputSnapshot> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_default_is_disconnected() {
        let store = MemoryStore::new();
        let snapshot = store.read().await.unwrap();
        assert_eq!(snapshot, InputSnapshot::disconnected());
        assert_eq!(store.id(), "memory");
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let store = MemoryStore::new();
        let outcome = store.write(InputSnapshot::new("hello", true)).await.unwrap();
        assert!(outcome.is_written());

        let snapshot = store.read().await.unwrap();
        assert_eq!(snapshot.text, "hello");
        assert!(snapshot.connected);
        assert!(snapshot.observed_at.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_write_notifies_once() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();

        store.write(InputSnapshot::new("same", true)).await.unwrap();
        let second = store.write(InputSnapshot::new("same", true)).await.unwrap();

        assert_eq!(second, WriteOutcome::Unchanged);
        assert_eq!(rx.recv().await.unwrap().text, "same");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_writing_default_is_unchanged() {
        let store = MemoryStore::new();
        let outcome = store.write(InputSnapshot::new("", false)).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_connectivity_flip_is_a_change() {
        let store = MemoryStore::new();
        store.write(InputSnapshot::new("kept", true)).await.unwrap();
        let outcome = store.write(InputSnapshot::new("kept", false)).await.unwrap();
        assert!(outcome.is_written());
        let snapshot = store.read().await.unwrap();
        assert_eq!(snapshot.text, "kept");
        assert!(!snapshot.connected);
    }

    #[tokio::test]
    async fn test_timestamps_strictly_increase() {
        let store = MemoryStore::new();
        let mut previous = None;
        for text in ["a", "ab", "abc", "abcd"] {
            let WriteOutcome::Written(snapshot) =
                store.write(InputSnapshot::new(text, true)).await.unwrap()
            else {
                panic!("expected a write for {text}");
            };
            if let Some(prev) = previous {
                assert!(snapshot.observed_at > Some(prev));
            }
            previous = snapshot.observed_at;
        }
    }
}
