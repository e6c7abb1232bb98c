//! # Augmenter Observer
//!
//! The observer context: runs beside the host page, finds its text-entry
//! element, and publishes the element's text and connectivity to the
//! synchronization store.
//!
//! ## Pipeline
//!
//! - [`ElementLocator`] - Ordered selector rules with a visibility guard
//! - [`TextExtractor`] - Reads the text of a located element by kind
//! - [`ChangeDetector`] - Bound/unbound state machine, decides when to write
//! - [`ObserverContext`] - Signal loop (mutations, interactions, polling, refresh)
//!
//! ## Refresh
//!
//! A [`RefreshHandle`] asks a running context to re-locate and re-extract
//! immediately; [`server`] exposes the same request over HTTP.

pub mod detector;
pub mod error;
pub mod extractor;
pub mod locator;
pub mod metrics;
pub mod observer;
pub mod page_file;
pub mod refresh;
pub mod server;

pub use detector::{ChangeDetector, DetectorState, Observation, TriggerSet, Update, UpdateReason};
pub use error::ObserverError;
pub use extractor::TextExtractor;
pub use locator::{ElementLocator, LocatedElement};
pub use metrics::{MetricsSnapshot, ObserverMetrics};
pub use observer::{CycleReport, ObserverContext, ObserverOptions};
pub use page_file::{PageFileBridge, load_page};
pub use refresh::{ObserverStatus, RefreshHandle};
pub use server::{create_router, serve};
