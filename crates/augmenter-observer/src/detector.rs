//! Change detector.
//!
//! ```text
//!            locate ok                     structural signal / refresh /
//!   UNBOUND ───────────▶ BOUND(element, text)  element failed re-verification
//!      ▲  │ locate fails        │  ▲                        │
//!      │  └─(stay, report       │  └── re-extract ◀─ tick, content,
//!      │     disconnected)      │                  interaction
//!      └────────────────────────┘
//! ```
//!
//! Every evaluation ends in a defined state. Updates are gated only on the
//! logical value `(text, connected)` versus what was last published to the
//! store, never on which trigger fired.

use std::fmt;

use augmenter_dom::{DomTree, NodeId};
use augmenter_protocols::InputSnapshot;
use tracing::{debug, info};

use crate::extractor::TextExtractor;
use crate::locator::{ElementLocator, LocatedElement};

#[cfg(test)]
#[path = "detector_tests.rs"]
mod tests;

/// Signals gathered for one evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerSet {
    /// Periodic poll.
    pub tick: bool,
    /// Child-list or watched-attribute mutation.
    pub structural: bool,
    /// Character-data mutation.
    pub content: bool,
    /// `input` / `keyup` on a relevant target.
    pub interaction: bool,
    /// Explicit refresh request.
    pub refresh: bool,
}

impl TriggerSet {
    pub fn tick() -> Self {
        Self {
            tick: true,
            ..Default::default()
        }
    }

    pub fn structural() -> Self {
        Self {
            structural: true,
            ..Default::default()
        }
    }

    pub fn content() -> Self {
        Self {
            content: true,
            ..Default::default()
        }
    }

    pub fn interaction() -> Self {
        Self {
            interaction: true,
            ..Default::default()
        }
    }

    pub fn refresh() -> Self {
        Self {
            refresh: true,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.tick || self.structural || self.content || self.interaction || self.refresh)
    }

    /// Whether the tracked element must be dropped and located again.
    pub fn forces_relocate(&self) -> bool {
        self.structural || self.refresh
    }

    pub fn merge(&mut self, other: TriggerSet) {
        self.tick |= other.tick;
        self.structural |= other.structural;
        self.content |= other.content;
        self.interaction |= other.interaction;
        self.refresh |= other.refresh;
    }
}

impl fmt::Display for TriggerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (self.tick, "tick"),
            (self.structural, "structural"),
            (self.content, "content"),
            (self.interaction, "interaction"),
            (self.refresh, "refresh"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join("+"))
        }
    }
}

/// Detector state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectorState {
    Unbound,
    Bound {
        element: LocatedElement,
        last_text: String,
    },
}

impl DetectorState {
    pub fn is_bound(&self) -> bool {
        matches!(self, DetectorState::Bound { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            DetectorState::Unbound => "unbound",
            DetectorState::Bound { .. } => "bound",
        }
    }
}

/// Why an update is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReason {
    ContentChanged,
    Connected,
    ConnectivityLost,
}

impl fmt::Display for UpdateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateReason::ContentChanged => write!(f, "content-changed"),
            UpdateReason::Connected => write!(f, "connected"),
            UpdateReason::ConnectivityLost => write!(f, "connectivity-lost"),
        }
    }
}

/// A value that should be written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub snapshot: InputSnapshot,
    pub reason: UpdateReason,
}

/// Result of one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observation {
    pub update: Option<Update>,
    /// A locate call succeeded after the detector was unbound.
    pub relocated: bool,
    /// A locate call found nothing.
    pub locate_failed: bool,
}

/// The change detection state machine.
#[derive(Debug)]
pub struct ChangeDetector {
    locator: ElementLocator,
    state: DetectorState,
    /// Value last known to be in the store.
    published: InputSnapshot,
}

impl ChangeDetector {
    pub fn new(locator: ElementLocator) -> Self {
        Self {
            locator,
            state: DetectorState::Unbound,
            published: InputSnapshot::disconnected(),
        }
    }

    /// Use `snapshot` (normally the store's current record) as the
    /// comparison baseline.
    pub fn seed(&mut self, snapshot: InputSnapshot) {
        self.published = snapshot;
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    pub fn is_bound(&self) -> bool {
        self.state.is_bound()
    }

    /// Node currently tracked, if any.
    pub fn tracked(&self) -> Option<NodeId> {
        match &self.state {
            DetectorState::Bound { element, .. } => Some(element.node),
            DetectorState::Unbound => None,
        }
    }

    pub fn published(&self) -> &InputSnapshot {
        &self.published
    }

    /// Record that `snapshot` is now the store's value.
    pub fn confirm(&mut self, snapshot: &InputSnapshot) {
        self.published = snapshot.clone();
    }

    /// Run one evaluation against the current document.
    pub fn evaluate(&mut self, tree: &DomTree, triggers: TriggerSet) -> Observation {
        let mut observation = Observation::default();

        if triggers.forces_relocate() && self.is_bound() {
            debug!(triggers = %triggers, "Dropping tracked element for relocation");
            self.state = DetectorState::Unbound;
        }

        if let DetectorState::Bound { element, .. } = &self.state {
            if !ElementLocator::verify(tree, element) {
                debug!(node = %element.node, "Tracked element failed re-verification");
                self.state = DetectorState::Unbound;
            }
        }

        if let DetectorState::Bound { element, last_text } = &mut self.state {
            *last_text = TextExtractor::extract(tree, element);
        } else if let Some(element) = self.locator.locate(tree) {
            let last_text = TextExtractor::extract(tree, &element);
            observation.relocated = true;
            self.state = DetectorState::Bound { element, last_text };
        } else {
            observation.locate_failed = true;
        }

        let candidate = match &self.state {
            DetectorState::Bound { last_text, .. } => InputSnapshot::new(last_text.clone(), true),
            DetectorState::Unbound => InputSnapshot::new(self.published.text.clone(), false),
        };

        if !candidate.same_value(&self.published) {
            let reason = match (self.published.connected, candidate.connected) {
                (true, false) => UpdateReason::ConnectivityLost,
                (false, true) => UpdateReason::Connected,
                _ => UpdateReason::ContentChanged,
            };
            if reason != UpdateReason::ContentChanged {
                info!(reason = %reason, "Host input connectivity changed");
            }
            observation.update = Some(Update {
                snapshot: candidate,
                reason,
            });
        }

        observation
    }
}
