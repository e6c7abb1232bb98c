//! Search and ingestion service errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service could not be reached at all (connect failure, timeout).
    #[error("Service unreachable: {0}")]
    Unreachable(String),

    /// The service answered with an error of its own.
    #[error("Service error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The service answered with something we could not decode.
    #[error("Malformed service response: {0}")]
    MalformedResponse(String),

    /// The request was rejected locally before being sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ServiceError {
    /// Message suitable for showing to the user.
    ///
    /// Each failure class gets a distinct wording so the user can tell a
    /// stopped backend from a backend that refused the request.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Unreachable(_) => {
                "Cannot reach the search service. Is the backend running?".to_string()
            }
            ServiceError::Server { message, .. } => format!("Search service error: {}", message),
            ServiceError::MalformedResponse(_) => {
                "The search service returned an unexpected response.".to_string()
            }
            ServiceError::InvalidInput(reason) => reason.clone(),
        }
    }
}
