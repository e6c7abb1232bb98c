//! Refresh protocol.
//!
//! A presentation context asks the observer context to re-locate and
//! re-extract immediately. The response only reports whether the cycle ran;
//! the data itself always arrives through the store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RefreshError;

/// Action carried by a refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshAction {
    #[serde(rename = "getInputText")]
    GetInputText,
}

/// Refresh request: `{"action": "getInputText"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub action: RefreshAction,
}

impl RefreshRequest {
    pub fn get_input_text() -> Self {
        Self {
            action: RefreshAction::GetInputText,
        }
    }
}

impl Default for RefreshRequest {
    fn default() -> Self {
        Self::get_input_text()
    }
}

/// Refresh response: `{"success": bool}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub success: bool,
}

impl RefreshResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }

    pub fn failed() -> Self {
        Self { success: false }
    }
}

/// Whether the observed page is the chat host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostStatus {
    /// The page has no known URL.
    #[default]
    Unknown,
    OnHost,
    OffHost,
}

impl HostStatus {
    /// Match `url` against host patterns (case-insensitive substrings).
    /// An empty pattern list accepts every URL.
    pub fn classify(url: Option<&str>, patterns: &[String]) -> Self {
        let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
            return HostStatus::Unknown;
        };
        if patterns.is_empty() {
            return HostStatus::OnHost;
        }
        let url = url.to_ascii_lowercase();
        if patterns
            .iter()
            .any(|p| url.contains(&p.to_ascii_lowercase()))
        {
            HostStatus::OnHost
        } else {
            HostStatus::OffHost
        }
    }

    pub fn is_off_host(&self) -> bool {
        matches!(self, HostStatus::OffHost)
    }
}

/// Observer health: `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverHealth {
    pub status: String,
    pub state: String,
    pub connected: bool,
    #[serde(default)]
    pub host: HostStatus,
}

/// Transport for refresh requests.
#[async_trait]
pub trait RefreshChannel: Send + Sync {
    /// Send a refresh request and wait (bounded) for the answer.
    async fn request_refresh(&self, request: RefreshRequest) -> Result<RefreshResponse, RefreshError>;

    /// Whether the observer is looking at the chat host.
    async fn host_status(&self) -> Result<HostStatus, RefreshError> {
        Ok(HostStatus::Unknown)
    }
}
