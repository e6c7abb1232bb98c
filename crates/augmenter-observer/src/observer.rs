//! Observer context loop.
//!
//! Owns the locator, extractor and detector, listens to every change signal
//! the page offers, and writes detected changes to the store. Signals that
//! arrive while a cycle is pending are coalesced into that cycle.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use augmenter_config::ObserverConfig;
use augmenter_dom::{
    InteractionEvent, MutationKind, MutationObserverInit, MutationRecord, Page,
};
use augmenter_protocols::{HostStatus, RefreshResponse, SharedStore, WriteOutcome};

use crate::detector::{ChangeDetector, TriggerSet};
use crate::error::ObserverError;
use crate::locator::ElementLocator;
use crate::metrics::ObserverMetrics;
use crate::refresh::{ObserverStatus, RefreshCommand, RefreshHandle};

#[cfg(test)]
#[path = "observer_tests.rs"]
mod tests;

const COMMAND_CAPACITY: usize = 16;

/// Timing and filtering options.
#[derive(Debug, Clone)]
pub struct ObserverOptions {
    pub poll_interval: Duration,
    pub startup_delay: Duration,
    pub refresh_timeout: Duration,
    /// Attributes whose changes count as structural.
    pub attribute_filter: Vec<String>,
    /// URL substrings identifying the chat host.
    pub host_patterns: Vec<String>,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self::from(&ObserverConfig::default())
    }
}

impl From<&ObserverConfig> for ObserverOptions {
    fn from(config: &ObserverConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            startup_delay: Duration::from_millis(config.startup_delay_ms),
            refresh_timeout: Duration::from_millis(config.refresh_timeout_ms),
            attribute_filter: config.mutation_attribute_filter.clone(),
            host_patterns: config.host_patterns.clone(),
        }
    }
}

impl ObserverOptions {
    /// The document-wide mutation watch.
    pub fn mutation_init(&self) -> MutationObserverInit {
        MutationObserverInit {
            child_list: true,
            attributes: true,
            attribute_filter: Some(self.attribute_filter.clone()),
            character_data: true,
            subtree: true,
        }
    }
}

/// Outcome of one detection cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// The store value changed.
    pub written: bool,
    /// A store write was attempted and failed.
    pub write_failed: bool,
}

impl CycleReport {
    /// Answer for refresh requests served by this cycle.
    pub fn refresh_response(&self) -> RefreshResponse {
        if self.write_failed {
            RefreshResponse::failed()
        } else {
            RefreshResponse::ok()
        }
    }
}

/// The observer context.
pub struct ObserverContext {
    page: Arc<Page>,
    store: SharedStore,
    detector: ChangeDetector,
    options: ObserverOptions,
    metrics: Arc<ObserverMetrics>,
    status: Arc<RwLock<ObserverStatus>>,
    command_tx: mpsc::Sender<RefreshCommand>,
    command_rx: Option<mpsc::Receiver<RefreshCommand>>,
}

impl ObserverContext {
    pub fn new(
        page: Arc<Page>,
        store: SharedStore,
        locator: ElementLocator,
        options: ObserverOptions,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        Self {
            page,
            store,
            detector: ChangeDetector::new(locator),
            options,
            metrics: Arc::new(ObserverMetrics::new()),
            status: Arc::new(RwLock::new(ObserverStatus::default())),
            command_tx,
            command_rx: Some(command_rx),
        }
    }

    /// Build from configuration, parsing the configured locator rules.
    pub fn from_config(
        page: Arc<Page>,
        store: SharedStore,
        config: &ObserverConfig,
    ) -> Result<Self, ObserverError> {
        let locator = ElementLocator::from_selectors(&config.locator.selectors)?;
        Ok(Self::new(page, store, locator, ObserverOptions::from(config)))
    }

    pub fn handle(&self) -> RefreshHandle {
        RefreshHandle::new(
            self.command_tx.clone(),
            Arc::clone(&self.status),
            self.options.refresh_timeout,
        )
    }

    pub fn metrics(&self) -> Arc<ObserverMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    pub fn status(&self) -> ObserverStatus {
        *self.status.read()
    }

    /// Use the store's current record as the comparison baseline, so a
    /// record persisted by an earlier session is not rewritten unchanged.
    pub async fn seed(&mut self) {
        match self.store.read().await {
            Ok(snapshot) => {
                debug!(connected = snapshot.connected, "Seeded detector from store");
                self.detector.seed(snapshot);
            }
            Err(e) => warn!("Could not read store for seeding: {}", e),
        }
    }

    /// Run one detection cycle. Store failures are reported in the result,
    /// never returned as errors.
    pub async fn run_cycle(&mut self, triggers: TriggerSet) -> CycleReport {
        self.metrics.record_cycle();
        if triggers.refresh {
            self.metrics.record_refresh();
        }

        let detector = &mut self.detector;
        let observation = self.page.read(|tree| detector.evaluate(tree, triggers));
        if observation.relocated {
            self.metrics.record_relocation();
        }
        if observation.locate_failed {
            self.metrics.record_locate_failure();
        }

        let mut report = CycleReport::default();
        match observation.update {
            None => self.metrics.record_suppressed(),
            Some(update) => match self.store.write(update.snapshot.clone()).await {
                Ok(WriteOutcome::Written(stamped)) => {
                    debug!(
                        reason = %update.reason,
                        chars = stamped.char_count(),
                        connected = stamped.connected,
                        "Input state published"
                    );
                    self.detector.confirm(&stamped);
                    self.metrics.record_write();
                    report.written = true;
                }
                Ok(WriteOutcome::Unchanged) => {
                    self.detector.confirm(&update.snapshot);
                    self.metrics.record_suppressed();
                }
                Err(e) => {
                    error!("Store write failed: {}", e);
                    self.metrics.record_write_failure();
                    report.write_failed = true;
                }
            },
        }

        let host = self.host_status();
        let previous = std::mem::replace(
            &mut *self.status.write(),
            ObserverStatus {
                bound: self.detector.is_bound(),
                connected: self.detector.published().connected,
                host,
            },
        );
        if previous.host != host && host.is_off_host() {
            warn!(url = ?self.page.url(), "Observed page is not the chat host");
        }
        debug!(triggers = %triggers, state = self.detector.state().name(), "Cycle complete");
        report
    }

    fn host_status(&self) -> HostStatus {
        HostStatus::classify(self.page.url().as_deref(), &self.options.host_patterns)
    }

    fn classify_batch(&self, batch: &[MutationRecord], triggers: &mut TriggerSet) {
        self.metrics.record_mutation_batch();
        for record in batch {
            match &record.kind {
                MutationKind::ChildList { .. } => triggers.structural = true,
                MutationKind::Attributes { name, .. } => {
                    if self
                        .options
                        .attribute_filter
                        .iter()
                        .any(|f| f.eq_ignore_ascii_case(name))
                    {
                        triggers.structural = true;
                    }
                }
                MutationKind::CharacterData { .. } => triggers.content = true,
            }
        }
    }

    fn classify_interaction(&self, event: &InteractionEvent, triggers: &mut TriggerSet) {
        let relevant = self.detector.tracked() == Some(event.target)
            || event.target_tag == "textarea"
            || event.target_editable;
        if relevant {
            self.metrics.record_interaction();
            triggers.interaction = true;
        }
    }

    /// Run until `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<(), ObserverError> {
        let mut commands = self
            .command_rx
            .take()
            .ok_or(ObserverError::AlreadyRunning)?;

        self.metrics.mark_start();
        self.seed().await;

        let mut mutations = self
            .page
            .observe(self.page.document(), self.options.mutation_init());
        let mut interactions = self.page.subscribe_interactions();

        info!(
            poll_ms = self.options.poll_interval.as_millis() as u64,
            startup_delay_ms = self.options.startup_delay.as_millis() as u64,
            "Observer context started"
        );

        tokio::select! {
            _ = tokio::time::sleep(self.options.startup_delay) => {}
            _ = cancel.cancelled() => {
                info!("Observer context cancelled before start");
                return Ok(());
            }
        }

        let mut ticker = tokio::time::interval(self.options.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let mut triggers = TriggerSet::default();
            let mut replies = Vec::new();

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Observer context shutting down");
                    break;
                }
                _ = ticker.tick() => triggers.tick = true,
                Some(batch) = mutations.recv() => self.classify_batch(&batch, &mut triggers),
                event = interactions.recv() => match event {
                    Ok(event) => self.classify_interaction(&event, &mut triggers),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Interaction listener lagged");
                        triggers.interaction = true;
                    }
                    Err(broadcast::error::RecvError::Closed) => {}
                },
                Some(command) = commands.recv() => {
                    triggers.refresh = true;
                    replies.push(command.reply);
                }
            }

            // Coalesce everything already pending into this cycle.
            while let Ok(batch) = mutations.try_recv() {
                self.classify_batch(&batch, &mut triggers);
            }
            loop {
                match interactions.try_recv() {
                    Ok(event) => self.classify_interaction(&event, &mut triggers),
                    Err(broadcast::error::TryRecvError::Lagged(_)) => triggers.interaction = true,
                    Err(_) => break,
                }
            }
            while let Ok(command) = commands.try_recv() {
                triggers.refresh = true;
                replies.push(command.reply);
            }

            if triggers.is_empty() {
                continue;
            }

            let report = self.run_cycle(triggers).await;
            for reply in replies {
                let _ = reply.send(report.refresh_response());
            }
        }

        let metrics = self.metrics.snapshot();
        info!(
            cycles = metrics.cycles,
            writes = metrics.writes,
            "Observer context stopped"
        );
        Ok(())
    }
}
