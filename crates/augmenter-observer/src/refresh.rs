//! In-process refresh channel into a running observer context.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use augmenter_protocols::{
    HostStatus, RefreshChannel, RefreshError, RefreshRequest, RefreshResponse,
};

/// Queued refresh request awaiting its cycle.
#[derive(Debug)]
pub(crate) struct RefreshCommand {
    pub reply: oneshot::Sender<RefreshResponse>,
}

/// What the observer context last reported about itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ObserverStatus {
    pub bound: bool,
    pub connected: bool,
    pub host: HostStatus,
}

impl ObserverStatus {
    pub fn state_name(&self) -> &'static str {
        if self.bound { "bound" } else { "unbound" }
    }
}

/// Cloneable handle for asking the observer context to re-locate and
/// re-extract immediately.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    commands: mpsc::Sender<RefreshCommand>,
    status: Arc<RwLock<ObserverStatus>>,
    timeout: Duration,
}

impl RefreshHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<RefreshCommand>,
        status: Arc<RwLock<ObserverStatus>>,
        timeout: Duration,
    ) -> Self {
        Self {
            commands,
            status,
            timeout,
        }
    }

    pub fn status(&self) -> ObserverStatus {
        *self.status.read()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether the observer context is still accepting requests.
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    async fn round_trip(&self) -> Result<RefreshResponse, RefreshError> {
        let (reply, answer) = oneshot::channel();
        self.commands
            .send(RefreshCommand { reply })
            .await
            .map_err(|_| RefreshError::Unavailable("observer context is not running".to_string()))?;
        answer.await.map_err(|_| {
            RefreshError::Unavailable("observer context dropped the request".to_string())
        })
    }
}

#[async_trait]
impl RefreshChannel for RefreshHandle {
    async fn request_refresh(&self, request: RefreshRequest) -> Result<RefreshResponse, RefreshError> {
        debug!(action = ?request.action, "Refresh requested");
        match tokio::time::timeout(self.timeout, self.round_trip()).await {
            Ok(result) => result,
            Err(_) => Err(RefreshError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }

    async fn host_status(&self) -> Result<HostStatus, RefreshError> {
        if !self.is_running() {
            return Err(RefreshError::Unavailable(
                "observer context is not running".to_string(),
            ));
        }
        Ok(self.status().host)
    }
}
