//! Shared response handling for the search and ingestion clients.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use augmenter_protocols::ServiceError;
use augmenter_protocols::service::ErrorBody;

/// Classify a failure to get any response at all.
pub(crate) fn send_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Unreachable(format!("request timed out: {}", err))
    } else if err.is_connect() {
        ServiceError::Unreachable(format!("connection failed: {}", err))
    } else {
        ServiceError::Unreachable(err.to_string())
    }
}

/// Decode a service response.
///
/// Non-2xx statuses and `{"error": ...}` bodies are server-reported errors;
/// anything else that does not decode as `T` is malformed.
pub(crate) async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = response.status();
    let body = response.text().await.map_err(send_error)?;
    let value: Option<Value> = serde_json::from_str(&body).ok();

    let reported = value
        .as_ref()
        .and_then(|v| ErrorBody::deserialize(v).ok())
        .map(|b| b.error);

    if !status.is_success() {
        return Err(ServiceError::Server {
            status: status.as_u16(),
            message: reported.unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.to_string()
                } else {
                    body.clone()
                }
            }),
        });
    }
    if let Some(message) = reported {
        return Err(ServiceError::Server {
            status: status.as_u16(),
            message,
        });
    }

    match value {
        Some(value) => {
            serde_json::from_value(value).map_err(|e| ServiceError::MalformedResponse(e.to_string()))
        }
        None => Err(ServiceError::MalformedResponse(format!(
            "response is not JSON: {}",
            body.chars().take(80).collect::<String>()
        ))),
    }
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
