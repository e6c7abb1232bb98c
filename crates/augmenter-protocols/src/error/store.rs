//! Synchronization store errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store read failed: {0}")]
    ReadFailed(String),

    #[error("Store write failed: {0}")]
    WriteFailed(String),

    #[error("Corrupt store record: {0}")]
    Corrupt(String),

    #[error("Store watcher failed: {0}")]
    Watch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
