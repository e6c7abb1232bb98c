//! # Augmenter DOM
//!
//! In-memory model of the host document the observer context watches.
//!
//! ## Building blocks
//!
//! - [`DomTree`] - Arena tree with generation-checked [`NodeId`] handles
//! - [`Selector`] - Compound selector matching (`tag`, `#id`, `[attr*="v"]`, ...)
//! - [`MutationRecord`] / [`MutationObserverInit`] - Structural change records and filters
//! - [`InteractionEvent`] - `input` / `keyup` notifications
//! - [`Page`] - Shared, observable document with snapshot reconciliation
//!
//! A [`NodeId`] never keeps a node alive. Once the node is removed its slot
//! generation moves on and every lookup through the old id fails, so holders
//! must re-verify with [`DomTree::is_alive`] before trusting it.

pub mod error;
pub mod event;
pub mod mutation;
pub mod node;
pub mod page;
pub mod selector;
pub mod snapshot;
pub mod tree;

pub use error::DomError;
pub use event::{InteractionEvent, InteractionKind};
pub use mutation::{MutationKind, MutationObserverInit, MutationRecord};
pub use node::NodeId;
pub use page::{MutationStream, Page};
pub use selector::Selector;
pub use snapshot::{NodeSnapshot, PageSnapshot, TEXT_TAG};
pub use tree::DomTree;
