//! Host page backed by a snapshot file.
//!
//! The observer runs against a [`Page`]; when the page lives outside this
//! process, its state is exchanged as a JSON snapshot file. The bridge
//! reconciles the live page with the file whenever the file changes, so
//! edits show up as ordinary mutations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use augmenter_dom::{Page, PageSnapshot};

use crate::error::ObserverError;

/// Load a page from a snapshot file.
pub fn load_page(path: &Path) -> Result<Arc<Page>, ObserverError> {
    let snapshot = PageSnapshot::load(path)
        .map_err(|e| ObserverError::PageFile(format!("{}: {}", path.display(), e)))?;
    let page = Page::from_snapshot(&snapshot)?;
    info!(path = %path.display(), url = ?snapshot.url, "Loaded host page");
    Ok(Arc::new(page))
}

/// Keeps a [`Page`] in step with its snapshot file.
pub struct PageFileBridge {
    path: PathBuf,
    page: Arc<Page>,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl PageFileBridge {
    pub fn new(path: impl Into<PathBuf>, page: Arc<Page>) -> Self {
        Self {
            path: path.into(),
            page,
            watcher: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page(&self) -> Arc<Page> {
        Arc::clone(&self.page)
    }

    /// Re-read the file and reconcile the page with it.
    pub fn reload(&self) -> Result<(), ObserverError> {
        Self::apply(&self.path, &self.page)
    }

    fn apply(path: &Path, page: &Page) -> Result<(), ObserverError> {
        let snapshot = PageSnapshot::load(path)
            .map_err(|e| ObserverError::PageFile(format!("{}: {}", path.display(), e)))?;
        page.reconcile(&snapshot)?;
        debug!(path = %path.display(), "Page reconciled with file");
        Ok(())
    }

    /// Start reconciling on every change to the file. Idempotent.
    pub fn watch(&self) -> Result<(), ObserverError> {
        let mut slot = self.watcher.lock();
        if slot.is_some() {
            return Ok(());
        }

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let path = self.path.clone();
        let page = Arc::clone(&self.page);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                        return;
                    }
                    if !event.paths.iter().any(|p| p.file_name() == path.file_name()) {
                        return;
                    }
                    // Editors may leave the file half-written; the next event retries.
                    if let Err(e) = Self::apply(&path, &page) {
                        warn!("Page file not applied: {}", e);
                    }
                }
                Err(e) => warn!("Page watcher error: {}", e),
            },
            Config::default(),
        )
        .map_err(|e| ObserverError::PageFile(format!("Failed to create watcher: {}", e)))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| ObserverError::PageFile(format!("Failed to watch {:?}: {}", dir, e)))?;
        info!("Watching page file: {:?}", self.path);

        *slot = Some(watcher);
        Ok(())
    }

    pub fn unwatch(&self) {
        if self.watcher.lock().take().is_some() {
            debug!("Stopped watching page file: {:?}", self.path);
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.lock().is_some()
    }
}
