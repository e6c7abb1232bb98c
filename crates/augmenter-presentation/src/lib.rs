//! # Augmenter Presentation
//!
//! Presentation contexts: surfaces that cannot see the host page and learn
//! its input state only through the synchronization store.
//!
//! - [`PresentationContext`] - Store subscription plus polling backstop, renders [`PopupView`]s
//! - [`HttpRefreshClient`] - Refresh requests to an observer over HTTP
//! - [`SearchClient`] - Queries the search service with the synchronized text
//! - [`IngestionClient`] - Uploads and deletes conversation exports
//! - [`SessionIdentity`] - Persisted identifier for uploads and searches

pub mod context;
pub mod error;
mod http;
pub mod ingest;
pub mod refresh_client;
pub mod search;
pub mod session;
pub mod view;

pub use context::{PresentationContext, PresentationOptions};
pub use error::PresentationError;
pub use ingest::{EXPORT_FILE_NAME, IngestionClient};
pub use refresh_client::HttpRefreshClient;
pub use search::SearchClient;
pub use session::SessionIdentity;
pub use view::{ConnectionStatus, PopupView};
