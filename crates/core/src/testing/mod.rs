//! Testing utilities and mock implementations.
//!
//! Mocks for the storage, mailing-list and randomness seams, so quiz stores
//! and the HTTP layer can be exercised without a database, network or
//! nondeterminism.
//!
//! # Example
//!
//! ```rust,ignore
//! use timeline_quiz_core::testing::{fixtures, MockSnapshotStorage, SeededRandom};
//!
//! let storage = Arc::new(MockSnapshotStorage::new());
//! let store = QuizStore::new(Arc::new(fixtures::two_item_catalog()), QuizSettings::default())
//!     .with_storage(storage.clone())
//!     .with_random(Box::new(SeededRandom::new(7)));
//! ```

mod mock_mailing_list;
mod mock_random;
mod mock_snapshot_storage;

pub use mock_mailing_list::MockMailingList;
pub use mock_random::{ScriptedRandom, SeededRandom};
pub use mock_snapshot_storage::MockSnapshotStorage;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, Utc};

    use crate::catalog::{Item, ItemCatalog, ItemId};
    use crate::quiz::snapshot::{PersistedSnapshot, SNAPSHOT_VERSION};

    /// Item `id` belonging at `position`, dated `1900 + position`.
    pub fn item(id: &str, position: usize) -> Item {
        Item {
            id: ItemId::from(id),
            name: format!("Item {}", id),
            description: String::new(),
            correct_position: position,
            year: 1900 + position as i32,
        }
    }

    /// Catalog built from `(id, correct_position)` pairs, in the given order.
    ///
    /// Panics on duplicate ids.
    pub fn catalog_from(entries: &[(&str, usize)]) -> ItemCatalog {
        ItemCatalog::new(entries.iter().map(|(id, pos)| item(id, *pos)).collect())
            .expect("fixture ids must be unique")
    }

    /// Items "1" and "2" belonging at slots 0 and 1.
    pub fn two_item_catalog() -> ItemCatalog {
        catalog_from(&[("1", 0), ("2", 1)])
    }

    /// A current-version snapshot payload for the given ids.
    pub fn snapshot_payload(
        saved_at: DateTime<Utc>,
        pool: &[&str],
        slots: &[Option<&str>],
    ) -> String {
        serde_json::to_string(&PersistedSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at,
            pool: pool.iter().map(|id| ItemId::from(*id)).collect(),
            slots: slots.iter().map(|slot| slot.map(ItemId::from)).collect(),
        })
        .expect("snapshot serializes")
    }
}
