//! Top-level protocol error type.

use thiserror::Error;

use super::{RefreshError, ServiceError, StoreError};

/// Top-level protocol error type.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Refresh error: {0}")]
    Refresh(#[from] RefreshError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_from() {
        let err = ProtocolError::from(StoreError::WriteFailed("x".to_string()));
        assert!(err.to_string().contains("Store error"));
    }

    #[test]
    fn test_refresh_error_from() {
        let err = ProtocolError::from(RefreshError::Timeout { timeout_ms: 10 });
        assert!(err.to_string().contains("Refresh error"));
    }

    #[test]
    fn test_service_error_from() {
        let err = ProtocolError::from(ServiceError::Unreachable("down".to_string()));
        assert!(err.to_string().contains("Service error"));
    }

    #[test]
    fn test_serialization_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err = ProtocolError::from(json_err);
        assert!(err.to_string().contains("Serialization error"));
    }
}
