//! Session identity shared with the ingestion and search services.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::error::PresentationError;

pub const SESSION_FILE_NAME: &str = "session.json";

/// Identifier under which this user's uploads are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub uuid: String,
    pub created_at: DateTime<Utc>,
}

impl SessionIdentity {
    pub fn generate() -> Self {
        Self {
            uuid: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        }
    }

    /// The session file kept next to the store file.
    pub fn path_beside(store_path: &Path) -> PathBuf {
        store_path.with_file_name(SESSION_FILE_NAME)
    }

    /// Read the persisted identity, if any.
    pub async fn load(path: &Path) -> Result<Option<Self>, PresentationError> {
        match fs::read_to_string(path).await {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|e| PresentationError::Session(format!("{}: {}", path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PresentationError::Session(format!("{}: {}", path.display(), e))),
        }
    }

    /// Reuse the persisted identity or create and persist a new one.
    pub async fn load_or_create(path: &Path) -> Result<Self, PresentationError> {
        if let Some(identity) = Self::load(path).await? {
            return Ok(identity);
        }

        let identity = Self::generate();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| PresentationError::Session(e.to_string()))?;
            }
        }
        let json = serde_json::to_string_pretty(&identity)
            .map_err(|e| PresentationError::Session(e.to_string()))?;
        fs::write(path, json)
            .await
            .map_err(|e| PresentationError::Session(format!("{}: {}", path.display(), e)))?;
        info!(uuid = %identity.uuid, "Created session identity");
        Ok(identity)
    }
}
