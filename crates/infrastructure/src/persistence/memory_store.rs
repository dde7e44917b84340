//! In-process durable store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use harbor_application::ports::{DurableStore, StorageChange, StorageError};
use tokio::sync::broadcast;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Shared in-memory store.
///
/// Clones see the same values and the same change stream, which lets several
/// `HarborClient`s in one process behave like tabs sharing local storage.
#[derive(Debug, Clone)]
pub struct MemoryDurableStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    changes: broadcast::Sender<StorageChange>,
}

impl MemoryDurableStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
            changes,
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn publish(&self, key: &str, new_value: Option<String>) {
        let _ = self.changes.send(StorageChange {
            key: key.to_string(),
            new_value,
        });
    }
}

impl Default for MemoryDurableStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DurableStore for MemoryDurableStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let previous = self
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        if previous.as_deref() != Some(value) {
            self.publish(key, Some(value.to_string()));
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let previous = self
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        if previous.is_some() {
            self.publish(key, None);
        }
        Ok(())
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<StorageChange>> {
        Some(self.changes.subscribe())
    }
}
