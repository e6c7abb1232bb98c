//! Shared, observable document.

use parking_lot::{Mutex, RwLock};
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

use crate::error::DomError;
use crate::event::{InteractionEvent, InteractionKind};
use crate::mutation::{MutationObserverInit, MutationRecord};
use crate::node::NodeId;
use crate::snapshot::PageSnapshot;
use crate::tree::DomTree;

#[cfg(test)]
#[path = "page_tests.rs"]
mod tests;

/// Receiver side of a mutation observer registration.
///
/// Each item is one batch: the records of a single [`Page::mutate`] call
/// that the observer's filter accepted.
pub type MutationStream = mpsc::UnboundedReceiver<Vec<MutationRecord>>;

const INTERACTION_CAPACITY: usize = 256;

struct Registration {
    target: NodeId,
    init: MutationObserverInit,
    sender: mpsc::UnboundedSender<Vec<MutationRecord>>,
}

/// A live document shared between the host (which mutates it) and
/// observers (which read it and listen for changes).
pub struct Page {
    tree: RwLock<DomTree>,
    url: RwLock<Option<String>>,
    observers: Mutex<Vec<Registration>>,
    interactions: broadcast::Sender<InteractionEvent>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    /// An empty page holding only the document node.
    pub fn new() -> Self {
        Self::with_tree(DomTree::new(), None)
    }

    pub fn from_snapshot(snapshot: &PageSnapshot) -> Result<Self, DomError> {
        let tree = DomTree::from_snapshot(&snapshot.root)?;
        Ok(Self::with_tree(tree, snapshot.url.clone()))
    }

    fn with_tree(tree: DomTree, url: Option<String>) -> Self {
        let (interactions, _) = broadcast::channel(INTERACTION_CAPACITY);
        Self {
            tree: RwLock::new(tree),
            url: RwLock::new(url),
            observers: Mutex::new(Vec::new()),
            interactions,
        }
    }

    pub fn document(&self) -> NodeId {
        self.tree.read().document()
    }

    pub fn url(&self) -> Option<String> {
        self.url.read().clone()
    }

    /// Run `f` with read access to the tree.
    pub fn read<R>(&self, f: impl FnOnce(&DomTree) -> R) -> R {
        f(&self.tree.read())
    }

    /// Run `f` with write access and deliver the resulting records as one
    /// batch per observer. Records produced before an error are still
    /// delivered.
    pub fn mutate<R>(
        &self,
        f: impl FnOnce(&mut DomTree) -> Result<R, DomError>,
    ) -> Result<R, DomError> {
        let mut tree = self.tree.write();
        let result = f(&mut tree);
        let records = tree.take_records();
        if !records.is_empty() {
            self.deliver(&tree, records);
        }
        result
    }

    fn deliver(&self, tree: &DomTree, records: Vec<MutationRecord>) {
        let mut observers = self.observers.lock();
        observers.retain(|reg| !reg.sender.is_closed());
        for reg in observers.iter() {
            let batch: Vec<MutationRecord> = records
                .iter()
                .filter(|r| reg.init.accepts(tree, reg.target, r))
                .cloned()
                .collect();
            if !batch.is_empty() {
                let _ = reg.sender.send(batch);
            }
        }
        debug!(records = records.len(), observers = observers.len(), "Delivered mutation records");
    }

    /// Register a mutation observer on `target`. Dropping the stream
    /// disconnects it.
    pub fn observe(&self, target: NodeId, init: MutationObserverInit) -> MutationStream {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.observers.lock().push(Registration {
            target,
            init,
            sender,
        });
        receiver
    }

    /// Number of connected mutation observers.
    pub fn observer_count(&self) -> usize {
        let mut observers = self.observers.lock();
        observers.retain(|reg| !reg.sender.is_closed());
        observers.len()
    }

    /// Listen for `input` and `keyup` events anywhere in the document.
    pub fn subscribe_interactions(&self) -> broadcast::Receiver<InteractionEvent> {
        self.interactions.subscribe()
    }

    pub fn dispatch_input(&self, target: NodeId) -> Result<(), DomError> {
        self.dispatch(InteractionKind::Input, target)
    }

    pub fn dispatch_keyup(&self, target: NodeId) -> Result<(), DomError> {
        self.dispatch(InteractionKind::KeyUp, target)
    }

    fn dispatch(&self, kind: InteractionKind, target: NodeId) -> Result<(), DomError> {
        let event = {
            let tree = self.tree.read();
            let tag = tree.tag(target).ok_or(DomError::StaleNode(target))?;
            InteractionEvent {
                kind,
                target,
                target_tag: tag.to_string(),
                target_editable: tree.is_content_editable(target),
            }
        };
        // No listeners is fine; events are fire-and-forget.
        let _ = self.interactions.send(event);
        Ok(())
    }

    /// Type `text` into a field the way a user would: assign the value,
    /// then fire `input` and `keyup`.
    pub fn type_into(&self, target: NodeId, text: &str) -> Result<(), DomError> {
        self.mutate(|tree| tree.set_value(target, text))?;
        self.dispatch_input(target)?;
        self.dispatch_keyup(target)
    }

    /// Reconcile the live document with `snapshot`.
    pub fn reconcile(&self, snapshot: &PageSnapshot) -> Result<(), DomError> {
        self.mutate(|tree| tree.reconcile(&snapshot.root))?;
        *self.url.write() = snapshot.url.clone();
        Ok(())
    }

    /// Serialize the current document.
    pub fn snapshot(&self) -> Option<PageSnapshot> {
        let tree = self.tree.read();
        let root = tree.children(tree.document()).first().copied()?;
        let root = tree.to_snapshot(root)?;
        Some(PageSnapshot {
            url: self.url(),
            root,
        })
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("url", &self.url())
            .field("nodes", &self.tree.read().len())
            .finish()
    }
}
