//! Persistence for in-progress quiz attempts.
//!
//! Quiz stores write through the [`SnapshotStorage`] trait. Writes are a
//! best-effort cache: a failing backend only means progress will not survive
//! a reload.

mod queued;
mod sqlite;
mod traits;

pub use queued::{create_snapshot_writer, QueuedSnapshotStorage, SnapshotWriter, StorageCommand};
pub use sqlite::SqliteSnapshotStorage;
pub use traits::{SnapshotStorage, StorageError};
