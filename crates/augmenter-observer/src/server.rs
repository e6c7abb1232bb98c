//! HTTP endpoint exposing the refresh protocol to other processes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use augmenter_protocols::{
    ObserverHealth, RefreshChannel, RefreshError, RefreshRequest, RefreshResponse,
};

use crate::error::ObserverError;
use crate::refresh::RefreshHandle;

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;

/// Create the router for the refresh endpoint.
pub fn create_router(handle: RefreshHandle) -> Router {
    Router::new()
        .route("/refresh", post(refresh))
        .route("/health", get(health_check))
        .with_state(handle)
}

/// `POST /refresh`.
///
/// The body is parsed by hand so malformed requests and unknown actions
/// both answer 400.
async fn refresh(State(handle): State<RefreshHandle>, body: String) -> Response {
    let request: RefreshRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!("Rejected refresh request: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("invalid refresh request: {}", e) })),
            )
                .into_response();
        }
    };

    match handle.request_refresh(request).await {
        Ok(response) => Json(response).into_response(),
        Err(e @ RefreshError::Timeout { .. }) => {
            warn!("Refresh timed out: {}", e);
            (StatusCode::GATEWAY_TIMEOUT, Json(RefreshResponse::failed())).into_response()
        }
        Err(e) => {
            warn!("Refresh failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, Json(RefreshResponse::failed())).into_response()
        }
    }
}

/// `GET /health`.
async fn health_check(State(handle): State<RefreshHandle>) -> impl IntoResponse {
    let status = handle.status();
    Json(ObserverHealth {
        status: "ok".to_string(),
        state: status.state_name().to_string(),
        connected: status.connected,
        host: status.host,
    })
}

/// Serve the refresh endpoint on `addr` until `cancel` fires.
pub async fn serve(
    addr: &str,
    handle: RefreshHandle,
    cancel: CancellationToken,
) -> Result<(), ObserverError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ObserverError::Server(format!("Failed to bind {}: {}", addr, e)))?;
    info!("Refresh endpoint listening on http://{}", addr);

    axum::serve(listener, create_router(handle))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| ObserverError::Server(e.to_string()))
}
