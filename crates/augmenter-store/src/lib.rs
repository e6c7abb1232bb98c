//! # Augmenter Store
//!
//! Implementations of [`SyncStore`](augmenter_protocols::SyncStore):
//!
//! - [`MemoryStore`] - Process-local store with broadcast notifications
//! - [`FileStore`] - JSON-file store shared across processes, with a
//!   filesystem watcher for notifications about writes made elsewhere

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Capacity of the notification channel of every store.
pub const NOTIFY_CAPACITY: usize = 64;
