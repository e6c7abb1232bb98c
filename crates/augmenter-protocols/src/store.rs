//! Synchronization store protocol.
//!
//! The store is the only channel between the observer context and the
//! presentation contexts. Every context mutates it through [`SyncStore::write`]
//! and nothing else.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::StoreError;
use crate::snapshot::{InputSnapshot, WriteOutcome};

/// Core trait for synchronization stores.
#[async_trait]
pub trait SyncStore: Send + Sync {
    /// Returns the store ID.
    fn id(&self) -> &str;

    /// Write a snapshot.
    ///
    /// Writes whose text and connectivity equal the stored value are dropped
    /// and produce no notification. Accepted writes are stamped with a fresh,
    /// strictly increasing observation time (last writer wins).
    async fn write(&self, snapshot: InputSnapshot) -> Result<WriteOutcome, StoreError>;

    /// Read the last written snapshot, or the default disconnected snapshot.
    async fn read(&self) -> Result<InputSnapshot, StoreError>;

    /// Subscribe to change notifications.
    ///
    /// Delivery is asynchronous and at-least-once; consumers should treat
    /// each notification as "re-read or use this value", not as a delta.
    fn subscribe(&self) -> broadcast::Receiver<InputSnapshot>;
}

/// Shared handle to a store.
pub type SharedStore = Arc<dyn SyncStore>;
