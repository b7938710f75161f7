//! Mock snapshot storage for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::storage::{SnapshotStorage, StorageError};

/// In-memory [`SnapshotStorage`] that records calls and can be told to fail.
///
/// ```rust,ignore
/// use timeline_quiz_core::testing::MockSnapshotStorage;
///
/// let storage = Arc::new(MockSnapshotStorage::new());
/// let store = QuizStore::new(catalog, settings).with_storage(storage.clone());
///
/// storage.set_fail_writes(true);
/// ```
#[derive(Debug, Default)]
pub struct MockSnapshotStorage {
    entries: Mutex<HashMap<String, String>>,
    saves: AtomicUsize,
    clears: AtomicUsize,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MockSnapshotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current payload for `key`, bypassing failure injection.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Seed a payload directly, bypassing failure injection and counters.
    pub fn insert(&self, key: &str, payload: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), payload.to_string());
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Number of successful clears.
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    /// Make `save` and `clear` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make `load` fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_writes(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Database("mock write failure".to_string()));
        }
        Ok(())
    }
}

impl SnapshotStorage for MockSnapshotStorage {
    fn save(&self, key: &str, payload: &str) -> Result<(), StorageError> {
        self.check_writes()?;
        self.insert(key, payload);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Database("mock read failure".to_string()));
        }
        Ok(self.get(key))
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.check_writes()?;
        self.entries.lock().unwrap().remove(key);
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
