//! Configuration schema definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::loader::ConfigLoader;

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub observer: ObserverConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub presentation: PresentationConfig,

    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,
}

/// Observer context configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserverConfig {
    /// Periodic tick interval.
    #[serde(default = "default_observer_poll_ms")]
    pub poll_interval_ms: u64,

    /// Delay before the first locate attempt, so the host page can settle.
    #[serde(default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,

    /// Upper bound on how long a refresh requester waits for an answer.
    #[serde(default = "default_refresh_timeout_ms")]
    pub refresh_timeout_ms: u64,

    /// Attributes whose changes count as structural mutations.
    #[serde(default = "default_attribute_filter")]
    pub mutation_attribute_filter: Vec<String>,

    /// URL substrings identifying the chat host. Empty accepts any page.
    #[serde(default = "default_host_patterns")]
    pub host_patterns: Vec<String>,

    #[serde(default)]
    pub locator: LocatorConfig,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_observer_poll_ms(),
            startup_delay_ms: default_startup_delay_ms(),
            refresh_timeout_ms: default_refresh_timeout_ms(),
            mutation_attribute_filter: default_attribute_filter(),
            host_patterns: default_host_patterns(),
            locator: LocatorConfig::default(),
        }
    }
}

fn default_observer_poll_ms() -> u64 {
    500
}

fn default_startup_delay_ms() -> u64 {
    1000
}

fn default_refresh_timeout_ms() -> u64 {
    2000
}

fn default_attribute_filter() -> Vec<String> {
    vec!["contenteditable".to_string(), "placeholder".to_string()]
}

fn default_host_patterns() -> Vec<String> {
    vec!["chatgpt.com".to_string(), "chat.openai.com".to_string()]
}

/// Element locator rules, most specific first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorConfig {
    #[serde(default = "default_selectors")]
    pub selectors: Vec<String>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            selectors: default_selectors(),
        }
    }
}

/// Built-in locator rules.
pub fn default_selectors() -> Vec<String> {
    [
        "#prompt-textarea",
        r#"div[contenteditable="true"][data-testid*="textbox"]"#,
        r#"textarea[data-id="root"]"#,
        r#"textarea[placeholder*="Message"]"#,
        r#"textarea[placeholder*="Send a message"]"#,
        r#"div[contenteditable="true"]"#,
        "textarea",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Synchronization store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Location of the persisted store record. `~` is expanded.
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl StoreConfig {
    pub fn resolved_path(&self) -> PathBuf {
        PathBuf::from(ConfigLoader::expand_path(&self.path))
    }
}

fn default_store_path() -> String {
    "~/.augmenter/state.json".to_string()
}

/// Presentation context configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationConfig {
    /// Backstop poll interval for re-reading the store.
    #[serde(default = "default_presentation_poll_ms")]
    pub poll_interval_ms: u64,

    /// Wait after a successful refresh before re-reading the store.
    #[serde(default = "default_refresh_settle_ms")]
    pub refresh_settle_ms: u64,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_presentation_poll_ms(),
            refresh_settle_ms: default_refresh_settle_ms(),
        }
    }
}

fn default_presentation_poll_ms() -> u64 {
    2000
}

fn default_refresh_settle_ms() -> u64 {
    500
}

/// External search and ingestion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            top_k: default_top_k(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_top_k() -> u32 {
    5
}

fn default_timeout() -> u64 {
    30
}

/// Refresh endpoint served by the observer context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl RefreshConfig {
    /// `host:port` suitable for binding a listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL a presentation context uses to reach the endpoint.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8791
}
