//! # Augmenter Protocols
//!
//! Shared data model and protocol definitions for the Augmenter contexts.
//! Contains only types and interface definitions - no implementations.
//!
//! ## Core Types
//!
//! - [`InputSnapshot`] - Last known state of the host page's editable element
//! - [`StoreRecord`] - Persisted wire form of a snapshot
//! - [`RefreshRequest`] / [`RefreshResponse`] - On-demand refresh protocol
//! - [`SearchRequest`] / [`SearchResponse`] - Search service contract
//!
//! ## Core Traits
//!
//! - [`SyncStore`] - The single channel between observer and presentation contexts
//! - [`RefreshChannel`] - Point-to-point refresh request transport

pub mod error;
pub mod refresh;
pub mod service;
pub mod snapshot;
pub mod store;

pub use error::{ProtocolError, RefreshError, ServiceError, StoreError};
pub use refresh::{
    HostStatus, ObserverHealth, RefreshAction, RefreshChannel, RefreshRequest, RefreshResponse,
};
pub use service::{
    DeleteReport, ExtractReport, ExtractRequest, HealthReport, SearchHit, SearchRequest,
    SearchResponse,
};
pub use snapshot::{ElementKind, InputSnapshot, StoreRecord, WriteOutcome};
pub use store::{SharedStore, SyncStore};
