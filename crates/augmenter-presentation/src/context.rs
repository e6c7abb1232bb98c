//! Presentation context loop.
//!
//! Reads the synchronized input state from the store and renders it. Store
//! notifications give low latency; a fixed-interval reload is the backstop
//! for notifications that never arrive.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use augmenter_config::PresentationConfig;
use augmenter_protocols::{
    HostStatus, InputSnapshot, RefreshChannel, RefreshError, RefreshRequest, RefreshResponse,
    SharedStore, StoreRecord,
};

use crate::error::PresentationError;
use crate::view::PopupView;

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;

const RENDER_CAPACITY: usize = 16;
const TRIGGER_CAPACITY: usize = 4;

#[derive(Debug, Clone)]
pub struct PresentationOptions {
    pub poll_interval: Duration,
    /// Wait between a refresh request and re-reading the store.
    pub refresh_settle: Duration,
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self::from(&PresentationConfig::default())
    }
}

impl From<&PresentationConfig> for PresentationOptions {
    fn from(config: &PresentationConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            refresh_settle: Duration::from_millis(config.refresh_settle_ms),
        }
    }
}

/// One presentation surface.
pub struct PresentationContext {
    store: SharedStore,
    refresh: Option<Arc<dyn RefreshChannel>>,
    options: PresentationOptions,
    snapshot: InputSnapshot,
    propagation_failed: bool,
    host: HostStatus,
    last_view: Option<PopupView>,
    renders: broadcast::Sender<PopupView>,
    trigger_tx: mpsc::Sender<()>,
    trigger_rx: Option<mpsc::Receiver<()>>,
}

impl PresentationContext {
    pub fn new(store: SharedStore, options: PresentationOptions) -> Self {
        let (renders, _) = broadcast::channel(RENDER_CAPACITY);
        let (trigger_tx, trigger_rx) = mpsc::channel(TRIGGER_CAPACITY);
        Self {
            store,
            refresh: None,
            options,
            snapshot: InputSnapshot::disconnected(),
            propagation_failed: false,
            host: HostStatus::Unknown,
            last_view: None,
            renders,
            trigger_tx,
            trigger_rx: Some(trigger_rx),
        }
    }

    /// Attach the channel used for manual refresh.
    pub fn with_refresh(mut self, channel: Arc<dyn RefreshChannel>) -> Self {
        self.refresh = Some(channel);
        self
    }

    /// Receive every view that differs from the previous one.
    pub fn subscribe(&self) -> broadcast::Receiver<PopupView> {
        self.renders.subscribe()
    }

    /// Sender for asking the running loop to do a manual refresh.
    pub fn refresh_trigger(&self) -> mpsc::Sender<()> {
        self.trigger_tx.clone()
    }

    pub fn view(&self) -> Option<&PopupView> {
        self.last_view.as_ref()
    }

    pub fn snapshot(&self) -> &InputSnapshot {
        &self.snapshot
    }

    /// The current state in its store wire form.
    pub fn record(&self) -> StoreRecord {
        StoreRecord::from(self.snapshot.clone())
    }

    pub fn propagation_failed(&self) -> bool {
        self.propagation_failed
    }

    pub fn host(&self) -> HostStatus {
        self.host
    }

    /// Ask the observer which page it is looking at and render the result.
    /// An unreachable observer leaves the host unknown.
    pub async fn check_host(&mut self) -> HostStatus {
        let Some(channel) = &self.refresh else {
            return self.host;
        };
        let host = match channel.host_status().await {
            Ok(host) => host,
            Err(e) => {
                debug!("Host check failed: {}", e);
                HostStatus::Unknown
            }
        };
        if host != self.host {
            if host.is_off_host() {
                warn!("Observer is not on the chat host page");
            }
            self.host = host;
            self.render();
        }
        self.host
    }

    /// Re-read the store and render if the view changed.
    pub async fn reload(&mut self) -> Option<PopupView> {
        match self.store.read().await {
            Ok(snapshot) => self.snapshot = snapshot,
            Err(e) => {
                error!("Store read failed: {}", e);
                self.propagation_failed = true;
            }
        }
        self.render()
    }

    /// Take a notified value, ignoring notifications older than what is
    /// already shown.
    pub fn apply(&mut self, snapshot: InputSnapshot) -> Option<PopupView> {
        let older = match (snapshot.observed_at, self.snapshot.observed_at) {
            (Some(new), Some(current)) => new < current,
            (None, Some(_)) => true,
            _ => false,
        };
        if older {
            debug!("Ignoring out-of-order store notification");
            return None;
        }
        self.snapshot = snapshot;
        self.render()
    }

    fn render(&mut self) -> Option<PopupView> {
        let view = PopupView::from_snapshot(&self.snapshot, self.propagation_failed, self.host);
        if self.last_view.as_ref() == Some(&view) {
            return None;
        }
        let _ = self.renders.send(view.clone());
        self.last_view = Some(view.clone());
        Some(view)
    }

    /// Ask the observer to re-extract, wait for the write to settle, then
    /// reload. A failed round-trip shows the reload-the-page status until a
    /// later refresh succeeds.
    pub async fn manual_refresh(&mut self) -> Result<RefreshResponse, PresentationError> {
        let outcome = match &self.refresh {
            Some(channel) => channel.request_refresh(RefreshRequest::get_input_text()).await,
            None => Err(RefreshError::Unavailable(
                "no refresh channel configured".to_string(),
            )),
        };

        match &outcome {
            Ok(response) if response.success => {
                debug!("Refresh acknowledged");
                self.propagation_failed = false;
            }
            Ok(_) => {
                warn!("Observer reported a failed refresh");
                self.propagation_failed = true;
            }
            Err(e) => {
                error!("Refresh failed: {}", e);
                self.propagation_failed = true;
            }
        }
        self.render();

        tokio::time::sleep(self.options.refresh_settle).await;
        self.check_host().await;
        self.reload().await;
        outcome.map_err(PresentationError::from)
    }

    /// Run until `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        let Some(mut triggers) = self.trigger_rx.take() else {
            warn!("Presentation context is already running");
            return;
        };
        let mut notifications = Some(self.store.subscribe());
        self.reload().await;
        self.check_host().await;

        let mut ticker = tokio::time::interval(self.options.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        info!(
            store = self.store.id(),
            poll_ms = self.options.poll_interval.as_millis() as u64,
            "Presentation context started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Presentation context shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.check_host().await;
                    self.reload().await;
                }
                notified = next_notification(&mut notifications) => match notified {
                    Ok(snapshot) => {
                        self.apply(snapshot);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Store notifications lagged");
                        self.reload().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        warn!("Store notifications closed, relying on polling");
                        notifications = None;
                    }
                },
                Some(()) = triggers.recv() => {
                    if let Err(e) = self.manual_refresh().await {
                        warn!("Manual refresh failed: {}", e);
                    }
                }
            }
        }
    }
}

async fn next_notification(
    notifications: &mut Option<broadcast::Receiver<InputSnapshot>>,
) -> Result<InputSnapshot, broadcast::error::RecvError> {
    match notifications {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
