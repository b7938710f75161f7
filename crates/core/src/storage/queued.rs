//! Non-blocking snapshot writes through a background task.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::{SnapshotStorage, StorageError};

/// A write queued for the background writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCommand {
    Save { key: String, payload: String },
    Clear { key: String },
}

/// Storage adapter whose writes never block the caller.
///
/// `save` and `clear` are queued onto a bounded channel and applied by a
/// [`SnapshotWriter`]. `load` reads the inner storage directly, so it may not
/// observe writes that are still queued.
#[derive(Clone)]
pub struct QueuedSnapshotStorage {
    tx: mpsc::Sender<StorageCommand>,
    inner: Arc<dyn SnapshotStorage>,
}

impl QueuedSnapshotStorage {
    fn enqueue(&self, command: StorageCommand) -> Result<(), StorageError> {
        self.tx
            .try_send(command)
            .map_err(|e| StorageError::QueueUnavailable(e.to_string()))
    }
}

impl SnapshotStorage for QueuedSnapshotStorage {
    fn save(&self, key: &str, payload: &str) -> Result<(), StorageError> {
        self.enqueue(StorageCommand::Save {
            key: key.to_string(),
            payload: payload.to_string(),
        })
    }

    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.load(key)
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.enqueue(StorageCommand::Clear {
            key: key.to_string(),
        })
    }
}

/// Background task that applies queued writes to the inner storage.
pub struct SnapshotWriter {
    rx: mpsc::Receiver<StorageCommand>,
    inner: Arc<dyn SnapshotStorage>,
}

impl SnapshotWriter {
    /// Run the writer, consuming commands until every queue handle is dropped.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        tracing::info!("Snapshot writer started");

        while let Some(command) = self.rx.recv().await {
            let result = match &command {
                StorageCommand::Save { key, payload } => self.inner.save(key, payload),
                StorageCommand::Clear { key } => self.inner.clear(key),
            };
            if let Err(e) = result {
                tracing::warn!("Failed to apply snapshot {}: {}", command_kind(&command), e);
            }
        }

        tracing::info!("Snapshot writer shutting down");
    }
}

fn command_kind(command: &StorageCommand) -> &'static str {
    match command {
        StorageCommand::Save { .. } => "save",
        StorageCommand::Clear { .. } => "clear",
    }
}

/// Create a queued storage front and its writer.
///
/// Returns:
/// - `QueuedSnapshotStorage` - hand this to quiz stores (cheaply cloneable)
/// - `SnapshotWriter` - spawn this with `tokio::spawn(writer.run())`
pub fn create_snapshot_writer(
    inner: Arc<dyn SnapshotStorage>,
    buffer_size: usize,
) -> (QueuedSnapshotStorage, SnapshotWriter) {
    let (tx, rx) = mpsc::channel(buffer_size);
    let queued = QueuedSnapshotStorage {
        tx,
        inner: Arc::clone(&inner),
    };
    let writer = SnapshotWriter { rx, inner };
    (queued, writer)
}
