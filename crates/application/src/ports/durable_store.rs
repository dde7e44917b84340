//! Durable key-value storage port
//!
//! The browser build of the platform keeps session state in local storage;
//! here any persisted string map will do. Several client instances may share
//! one store, so changes are observable through [`DurableStore::subscribe`].

use async_trait::async_trait;
use tokio::sync::broadcast;

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

/// A write observed on the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    /// Key that changed
    pub key: String,
    /// New value, `None` when removed
    pub new_value: Option<String>,
}

/// Persistent string map shared by every client instance of a user.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Reads a value.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a value.
    ///
    /// # Errors
    /// Returns an error if the value cannot be persisted.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a value. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Removes several values.
    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }

    /// Subscribes to changes, if the backend can report them.
    fn subscribe(&self) -> Option<broadcast::Receiver<StorageChange>> {
        None
    }
}
