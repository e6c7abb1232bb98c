//! Status view model shown by presentation surfaces.

use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use augmenter_protocols::{HostStatus, InputSnapshot};

pub const CONNECTED_MESSAGE: &str = "Connected to host page";
pub const DISCONNECTED_MESSAGE: &str = "Not connected to host page";
pub const PROPAGATION_FAILED_MESSAGE: &str = "Error: please reload the host page";
pub const NO_INPUT_MESSAGE: &str = "No input detected";
pub const OFF_HOST_MESSAGE: &str = "Please navigate to the chat page";
pub const OPEN_HOST_MESSAGE: &str = "Please open the chat page in your browser";

/// Connection status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    /// A store or refresh round-trip failed; overrides the store's view.
    PropagationFailed,
    /// The observer is looking at a page that is not the chat host.
    OffHost,
}

impl ConnectionStatus {
    pub fn message(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => CONNECTED_MESSAGE,
            ConnectionStatus::Disconnected => DISCONNECTED_MESSAGE,
            ConnectionStatus::PropagationFailed => PROPAGATION_FAILED_MESSAGE,
            ConnectionStatus::OffHost => OFF_HOST_MESSAGE,
        }
    }
}

/// Everything a surface renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopupView {
    pub status: ConnectionStatus,
    /// The synchronized text, or `None` when blank.
    pub text: Option<String>,
    pub char_count: usize,
    /// `HH:MM:SS` in local time.
    pub last_updated: Option<String>,
}

impl PopupView {
    pub fn from_snapshot(snapshot: &InputSnapshot, propagation_failed: bool, host: HostStatus) -> Self {
        let status = if propagation_failed {
            ConnectionStatus::PropagationFailed
        } else if host.is_off_host() {
            ConnectionStatus::OffHost
        } else if snapshot.connected {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        };

        let text = (!snapshot.text.trim().is_empty()).then(|| snapshot.text.clone());
        let char_count = if text.is_some() { snapshot.char_count() } else { 0 };

        Self {
            status,
            text,
            char_count,
            last_updated: snapshot.observed_at.map(format_local_time),
        }
    }

    pub fn body(&self) -> &str {
        if self.status == ConnectionStatus::OffHost {
            return OPEN_HOST_MESSAGE;
        }
        self.text.as_deref().unwrap_or(NO_INPUT_MESSAGE)
    }
}

pub fn format_local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

impl fmt::Display for PopupView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.status.message())?;
        writeln!(f, "{}", self.body())?;
        write!(f, "{} characters", self.char_count)?;
        if let Some(time) = &self.last_updated {
            write!(f, "\nLast updated: {}", time)?;
        }
        Ok(())
    }
}
