//! File-backed durable store.
//!
//! Session values live in one JSON file, `session.json` under the platform
//! config directory by default:
//! ```json
//! {
//!   "entries": {
//!     "currentUserId": "42",
//!     "refreshToken": "eyJhbGciOi..."
//!   },
//!   "schema_version": 1
//! }
//! ```
//! The file is read on every `get`, so a login or logout by another process
//! is seen on the next request. A file that does not parse reads as empty
//! and is overwritten by the next write.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use harbor_application::ports::{DurableStore, StorageChange, StorageError};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, warn};

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

/// Current session file layout.
pub const SESSION_SCHEMA_VERSION: u32 = 1;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    entries: BTreeMap<String, String>,
    schema_version: u32,
}

/// Durable store persisted as a JSON file.
///
/// Clones share the write lock and the change channel, so every handle in a
/// process observes the others' writes.
#[derive(Debug, Clone)]
pub struct FileDurableStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
    changes: broadcast::Sender<StorageChange>,
}

impl FileDurableStore {
    /// Creates a store backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
            changes,
        }
    }

    /// Returns `<config_dir>/harbor/session.json`, if the platform has a
    /// config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("harbor").join("session.json"))
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<SessionFile, StorageError> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SessionFile::default());
            }
            Err(e) => return Err(e.into()),
        };
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(SessionFile::default());
        }

        let file: SessionFile = match from_json_bytes(&content) {
            Ok(file) => file,
            Err(e) => {
                // Unreadable content is replaced on the next write.
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                return Ok(SessionFile::default());
            }
        };
        if file.schema_version > SESSION_SCHEMA_VERSION {
            return Err(StorageError::Serialization(format!(
                "unsupported session schema version {}",
                file.schema_version
            )));
        }
        Ok(file)
    }

    async fn save(&self, mut file: SessionFile) -> Result<(), StorageError> {
        file.schema_version = SESSION_SCHEMA_VERSION;
        let content =
            to_json_stable_bytes(&file).map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        // Readers must never see a partially written file.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, content).await?;
        fs::rename(&staging, &self.path).await?;
        Ok(())
    }

    /// Applies `edit` to the stored entries and persists the result,
    /// returning the changes that actually happened.
    async fn update<F>(&self, edit: F) -> Result<Vec<StorageChange>, StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> Vec<StorageChange>,
    {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load().await?;
        let changes = edit(&mut file.entries);
        if !changes.is_empty() {
            self.save(file).await?;
        }
        Ok(changes)
    }

    fn publish(&self, changes: Vec<StorageChange>) {
        for change in changes {
            debug!(key = %change.key, removed = change.new_value.is_none(), "session file updated");
            // No receivers is fine.
            let _ = self.changes.send(change);
        }
    }
}

#[async_trait]
impl DurableStore for FileDurableStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load().await?.entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let changes = self
            .update(|entries| {
                if entries.get(key).map(String::as_str) == Some(value) {
                    return Vec::new();
                }
                entries.insert(key.to_string(), value.to_string());
                vec![StorageChange {
                    key: key.to_string(),
                    new_value: Some(value.to_string()),
                }]
            })
            .await?;
        self.publish(changes);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.remove_many(&[key]).await
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let changes = self
            .update(|entries| {
                keys.iter()
                    .filter(|key| entries.remove(**key).is_some())
                    .map(|key| StorageChange {
                        key: (*key).to_string(),
                        new_value: None,
                    })
                    .collect()
            })
            .await?;
        self.publish(changes);
        Ok(())
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<StorageChange>> {
        Some(self.changes.subscribe())
    }
}
