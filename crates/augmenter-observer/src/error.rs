//! Observer context errors.

use thiserror::Error;

use augmenter_dom::DomError;
use augmenter_protocols::StoreError;

#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("Invalid locator rule: {0}")]
    InvalidRule(#[source] DomError),

    #[error("Document error: {0}")]
    Dom(#[from] DomError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Page file error: {0}")]
    PageFile(String),

    #[error("Refresh server error: {0}")]
    Server(String),

    #[error("Observer context is already running")]
    AlreadyRunning,
}
