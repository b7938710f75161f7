//! Snapshot storage trait and error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Write queue unavailable: {0}")]
    QueueUnavailable(String),
}

/// Key-value storage for serialized quiz progress.
///
/// Implementations store opaque payloads; expiry is encoded inside the payload
/// and enforced by the reader.
pub trait SnapshotStorage: Send + Sync {
    /// Store `payload` under `key`, replacing any previous value.
    fn save(&self, key: &str, payload: &str) -> Result<(), StorageError>;

    /// Load the payload stored under `key`.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Remove the payload stored under `key`. Removing a missing key is not an error.
    fn clear(&self, key: &str) -> Result<(), StorageError>;
}
