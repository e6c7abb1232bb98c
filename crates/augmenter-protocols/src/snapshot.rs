//! Input snapshot and its persisted record form.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;

/// Kind of editable surface the observer is tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    /// A `textarea` or text `input`; its value property is authoritative.
    PlainTextField,
    /// An element with editable content enabled; text comes from rendering.
    RichEditRegion,
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementKind::PlainTextField => write!(f, "plain-text-field"),
            ElementKind::RichEditRegion => write!(f, "rich-edit-region"),
        }
    }
}

/// Last known state of the host page's editable element.
///
/// When `connected` is false, `text` and `observed_at` keep their last valid
/// values so consumers never flicker to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub text: String,
    pub observed_at: Option<DateTime<Utc>>,
    pub connected: bool,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self::disconnected()
    }
}

impl InputSnapshot {
    /// The snapshot a store reports before anything was ever written.
    pub fn disconnected() -> Self {
        Self {
            text: String::new(),
            observed_at: None,
            connected: false,
        }
    }

    /// An unstamped snapshot; the store assigns `observed_at` on write.
    pub fn new(text: impl Into<String>, connected: bool) -> Self {
        Self {
            text: text.into(),
            observed_at: None,
            connected,
        }
    }

    /// Whether two snapshots carry the same logical value.
    ///
    /// Timestamps are ignored: only text and connectivity decide whether a
    /// write is a change.
    pub fn same_value(&self, other: &InputSnapshot) -> bool {
        self.connected == other.connected && self.text == other.text
    }

    /// Number of characters (Unicode scalar values) in the text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Stamp this snapshot with a time strictly after `previous`.
    pub fn stamped(mut self, previous: Option<DateTime<Utc>>) -> Self {
        self.observed_at = Some(next_observation_time(previous, Utc::now()));
        self
    }
}

/// Pick an observation time that is `now`, or 1ms past `previous` if the
/// clock has not moved forward since the previous write.
pub fn next_observation_time(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match previous {
        Some(prev) if now <= prev => prev + Duration::milliseconds(1),
        _ => now,
    }
}

/// Persisted form of an [`InputSnapshot`], keyed by fixed field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRecord {
    #[serde(default)]
    pub current_input_text: String,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_connected: bool,
}

impl From<InputSnapshot> for StoreRecord {
    fn from(snapshot: InputSnapshot) -> Self {
        Self {
            current_input_text: snapshot.text,
            last_updated: snapshot.observed_at,
            is_connected: snapshot.connected,
        }
    }
}

impl From<StoreRecord> for InputSnapshot {
    fn from(record: StoreRecord) -> Self {
        Self {
            text: record.current_input_text,
            observed_at: record.last_updated,
            connected: record.is_connected,
        }
    }
}

/// Result of a store write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The value differed; this is the stamped snapshot now in the store.
    Written(InputSnapshot),
    /// The value matched the stored one; nothing was written or notified.
    Unchanged,
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written(_))
    }
}
