//! Presentation context errors.

use thiserror::Error;

use augmenter_protocols::{RefreshError, ServiceError, StoreError};

#[derive(Debug, Error)]
pub enum PresentationError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Refresh error: {0}")]
    Refresh(#[from] RefreshError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Session identity error: {0}")]
    Session(String),
}
