//! Refresh protocol errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefreshError {
    /// The receiving context is gone (observer stopped, page closed).
    #[error("Observer unavailable: {0}")]
    Unavailable(String),

    #[error("Refresh timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Refresh rejected: {0}")]
    Rejected(String),
}
