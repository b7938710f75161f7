//! Persisted progress format.
//!
//! Only item ids are written, never item payloads, so edits to item text do
//! not invalidate saved progress. Restoring re-resolves every id against the
//! current catalog and rejects anything it cannot account for.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Board;
use crate::catalog::{ItemCatalog, ItemId};

/// Current payload version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Tolerated clock skew for timestamps slightly in the future.
const MAX_CLOCK_SKEW_MINUTES: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub pool: Vec<ItemId>,
    pub slots: Vec<Option<ItemId>>,
}

/// Why a stored payload was treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotRejection {
    #[error("payload is not a valid snapshot: {0}")]
    Malformed(String),

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error("snapshot saved at {saved_at} is past its expiry")]
    Expired { saved_at: DateTime<Utc> },

    #[error("snapshot saved at {saved_at} is in the future")]
    FromFuture { saved_at: DateTime<Utc> },

    #[error("snapshot has {found} slots, expected {expected}")]
    SlotCountMismatch { expected: usize, found: usize },

    #[error("snapshot references unknown item {0}")]
    UnknownItem(ItemId),

    #[error("snapshot places item {0} more than once")]
    DuplicateItem(ItemId),
}

/// Serialize a board for storage.
pub fn encode(board: &Board, saved_at: DateTime<Utc>) -> Result<String, serde_json::Error> {
    serde_json::to_string(&PersistedSnapshot {
        version: SNAPSHOT_VERSION,
        saved_at,
        pool: board.pool().to_vec(),
        slots: board.slots().to_vec(),
    })
}

/// Decode a stored payload and rebuild a board against `catalog`.
///
/// Catalog items missing from the payload are appended to the pool so every
/// configured item still has exactly one location.
pub fn decode(
    payload: &str,
    catalog: &ItemCatalog,
    now: DateTime<Utc>,
    ttl: Duration,
) -> Result<Board, SnapshotRejection> {
    let snapshot: PersistedSnapshot =
        serde_json::from_str(payload).map_err(|e| SnapshotRejection::Malformed(e.to_string()))?;

    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotRejection::UnsupportedVersion(snapshot.version));
    }
    if now - snapshot.saved_at > ttl {
        return Err(SnapshotRejection::Expired {
            saved_at: snapshot.saved_at,
        });
    }
    if snapshot.saved_at - now > Duration::minutes(MAX_CLOCK_SKEW_MINUTES) {
        return Err(SnapshotRejection::FromFuture {
            saved_at: snapshot.saved_at,
        });
    }
    if snapshot.slots.len() != catalog.len() {
        return Err(SnapshotRejection::SlotCountMismatch {
            expected: catalog.len(),
            found: snapshot.slots.len(),
        });
    }

    let mut seen = HashSet::new();
    let referenced = snapshot
        .pool
        .iter()
        .chain(snapshot.slots.iter().flatten());
    for id in referenced {
        if !catalog.contains(id) {
            return Err(SnapshotRejection::UnknownItem(id.clone()));
        }
        if !seen.insert(id.clone()) {
            return Err(SnapshotRejection::DuplicateItem(id.clone()));
        }
    }

    let mut pool = snapshot.pool;
    pool.extend(catalog.ids().into_iter().filter(|id| !seen.contains(id)));

    Ok(Board::from_parts(pool, snapshot.slots))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{self, snapshot_payload as payload};

    fn ttl() -> Duration {
        Duration::days(7)
    }

    #[test]
    fn test_encode_writes_ids_only() {
        let catalog = fixtures::two_item_catalog();
        let mut board = Board::new(catalog.ids(), 2);
        board.place(&ItemId::from("2"), 0);

        let json = encode(&board, Utc::now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["pool"], serde_json::json!(["1"]));
        assert_eq!(value["slots"], serde_json::json!(["2", null]));
        assert!(!json.contains("name"));
    }

    #[test]
    fn test_decode_roundtrip() {
        let catalog = fixtures::two_item_catalog();
        let mut board = Board::new(catalog.ids(), 2);
        board.place(&ItemId::from("1"), 1);
        let now = Utc::now();

        let restored = decode(&encode(&board, now).unwrap(), &catalog, now, ttl()).unwrap();
        assert_eq!(restored, board);
    }

    #[test]
    fn test_decode_expired() {
        let catalog = fixtures::two_item_catalog();
        let now = Utc::now();
        let old = payload(now - Duration::days(8), &["1", "2"], &[None, None]);

        let err = decode(&old, &catalog, now, ttl()).unwrap_err();
        assert!(matches!(err, SnapshotRejection::Expired { .. }));
    }

    #[test]
    fn test_decode_just_inside_window() {
        let catalog = fixtures::two_item_catalog();
        let now = Utc::now();
        let recent = payload(now - Duration::days(6), &["1", "2"], &[None, None]);

        assert!(decode(&recent, &catalog, now, ttl()).is_ok());
    }

    #[test]
    fn test_decode_from_future() {
        let catalog = fixtures::two_item_catalog();
        let now = Utc::now();
        let future = payload(now + Duration::hours(2), &["1", "2"], &[None, None]);

        let err = decode(&future, &catalog, now, ttl()).unwrap_err();
        assert!(matches!(err, SnapshotRejection::FromFuture { .. }));
    }

    #[test]
    fn test_decode_unknown_id() {
        let catalog = fixtures::two_item_catalog();
        let now = Utc::now();
        let foreign = payload(now, &["1"], &[Some("99"), None]);

        let err = decode(&foreign, &catalog, now, ttl()).unwrap_err();
        assert_eq!(err, SnapshotRejection::UnknownItem(ItemId::from("99")));
    }

    #[test]
    fn test_decode_duplicate_id() {
        let catalog = fixtures::two_item_catalog();
        let now = Utc::now();
        let duplicated = payload(now, &["1", "2"], &[Some("1"), None]);

        let err = decode(&duplicated, &catalog, now, ttl()).unwrap_err();
        assert_eq!(err, SnapshotRejection::DuplicateItem(ItemId::from("1")));
    }

    #[test]
    fn test_decode_slot_count_mismatch() {
        let catalog = fixtures::two_item_catalog();
        let now = Utc::now();
        let short = payload(now, &["1", "2"], &[None]);

        let err = decode(&short, &catalog, now, ttl()).unwrap_err();
        assert_eq!(
            err,
            SnapshotRejection::SlotCountMismatch {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_decode_malformed_and_wrong_version() {
        let catalog = fixtures::two_item_catalog();
        let now = Utc::now();

        assert!(matches!(
            decode("not json", &catalog, now, ttl()),
            Err(SnapshotRejection::Malformed(_))
        ));

        let v2 = payload(now, &["1", "2"], &[None, None]).replace("\"version\":1", "\"version\":2");
        assert_eq!(
            decode(&v2, &catalog, now, ttl()),
            Err(SnapshotRejection::UnsupportedVersion(2))
        );
    }

    #[test]
    fn test_decode_appends_items_missing_from_payload() {
        let catalog = fixtures::catalog_from(&[("1", 0), ("2", 1), ("3", 2)]);
        let now = Utc::now();
        let partial = payload(now, &["2"], &[Some("1"), None, None]);

        let board = decode(&partial, &catalog, now, ttl()).unwrap();
        assert_eq!(board.pool(), &[ItemId::from("2"), ItemId::from("3")]);
        assert_eq!(board.slots()[0], Some(ItemId::from("1")));
    }
}
