//! File-persisted synchronization store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::fs;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, warn};

use augmenter_protocols::{InputSnapshot, StoreError, StoreRecord, SyncStore, WriteOutcome};

use crate::NOTIFY_CAPACITY;

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;

/// Store persisted as a single JSON record file.
///
/// Several processes may open the same path. Writes replace the file
/// atomically; [`FileStore::watch`] turns writes made by other processes
/// into notifications on this handle.
pub struct FileStore {
    id: String,
    path: PathBuf,
    write_lock: Mutex<()>,
    /// Last value this handle wrote or announced.
    last_seen: Arc<parking_lot::Mutex<Option<InputSnapshot>>>,
    sender: broadcast::Sender<InputSnapshot>,
    watcher: parking_lot::Mutex<Option<RecommendedWatcher>>,
}

impl FileStore {
    /// Open a store at `path`, creating its directory if needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
                info!("Created store directory: {:?}", parent);
            }
        }

        let (sender, _) = broadcast::channel(NOTIFY_CAPACITY);
        Ok(Self {
            id: format!("file:{}", path.display()),
            path,
            write_lock: Mutex::new(()),
            last_seen: Arc::new(parking_lot::Mutex::new(None)),
            sender,
            watcher: parking_lot::Mutex::new(None),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Parse a record file's content.
    pub fn parse(content: &str) -> Result<InputSnapshot, StoreError> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        if !value.is_object() {
            return Err(StoreError::Corrupt(format!(
                "expected a JSON object, found {}",
                json_kind(&value)
            )));
        }
        serde_json::from_value::<StoreRecord>(value)
            .map(InputSnapshot::from)
            .map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    async fn load(&self) -> Result<InputSnapshot, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Self::parse(&content).unwrap_or_else(|e| {
                warn!("Store file {:?} unreadable, using default: {}", self.path, e);
                InputSnapshot::disconnected()
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(InputSnapshot::disconnected()),
            Err(e) => Err(StoreError::ReadFailed(format!("{}: {}", self.path.display(), e))),
        }
    }

    async fn persist(&self, snapshot: &InputSnapshot) -> Result<(), StoreError> {
        let record = StoreRecord::from(snapshot.clone());
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        let temp = self.temp_path();
        fs::write(&temp, json)
            .await
            .map_err(|e| StoreError::WriteFailed(format!("{}: {}", temp.display(), e)))?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StoreError::WriteFailed(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }

    /// Start delivering writes made through other handles (or processes)
    /// to this handle's subscribers. Idempotent.
    pub fn watch(&self) -> Result<(), StoreError> {
        let mut slot = self.watcher.lock();
        if slot.is_some() {
            return Ok(());
        }

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let path = self.path.clone();
        let last_seen = Arc::clone(&self.last_seen);
        let sender = self.sender.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => Self::on_fs_event(&path, &last_seen, &sender, event),
                Err(e) => warn!("Store watcher error: {}", e),
            },
            Config::default(),
        )
        .map_err(|e| StoreError::Watch(format!("Failed to create watcher: {}", e)))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| StoreError::Watch(format!("Failed to watch {:?}: {}", dir, e)))?;
        info!("Watching store file: {:?}", self.path);

        *slot = Some(watcher);
        Ok(())
    }

    /// Stop the filesystem watcher.
    pub fn unwatch(&self) {
        if self.watcher.lock().take().is_some() {
            debug!("Stopped watching store file: {:?}", self.path);
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.lock().is_some()
    }

    fn on_fs_event(
        path: &Path,
        last_seen: &parking_lot::Mutex<Option<InputSnapshot>>,
        sender: &broadcast::Sender<InputSnapshot>,
        event: Event,
    ) {
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            return;
        }
        if !event.paths.iter().any(|p| p.file_name() == path.file_name()) {
            return;
        }

        let Ok(content) = std::fs::read_to_string(path) else {
            return;
        };
        let snapshot = match Self::parse(&content) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!("Ignoring partial store file: {}", e);
                return;
            }
        };

        let mut seen = last_seen.lock();
        if seen.as_ref() == Some(&snapshot) {
            return;
        }
        *seen = Some(snapshot.clone());
        drop(seen);

        debug!(connected = snapshot.connected, "Store changed on disk");
        let _ = sender.send(snapshot);
    }
}

#[async_trait]
impl SyncStore for FileStore {
    fn id(&self) -> &str {
        &self.id
    }

    async fn write(&self, snapshot: InputSnapshot) -> Result<WriteOutcome, StoreError> {
        let _guard = self.write_lock.lock().await;

        let current = self.load().await?;
        if current.same_value(&snapshot) {
            debug!(store = %self.id, "Write suppressed, value unchanged");
            return Ok(WriteOutcome::Unchanged);
        }

        let stamped = snapshot.stamped(current.observed_at);
        self.persist(&stamped).await?;
        *self.last_seen.lock() = Some(stamped.clone());

        debug!(
            store = %self.id,
            connected = stamped.connected,
            chars = stamped.char_count(),
            "Snapshot written"
        );
        let _ = self.sender.send(stamped.clone());
        Ok(WriteOutcome::Written(stamped))
    }

    async fn read(&self) -> Result<InputSnapshot, StoreError> {
        self.load().await
    }

    fn subscribe(&self) -> broadcast::Receiver<InputSnapshot> {
        self.sender.subscribe()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        self.unwatch();
    }
}
