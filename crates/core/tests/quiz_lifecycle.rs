//! Quiz lifecycle integration tests.
//!
//! These tests drive a store through its public operations only:
//! - Partition invariant under random operation sequences
//! - Undo reversibility within history capacity
//! - Restoring progress across store instances through SQLite
//! - Background persistence and mailing-list delivery

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

use timeline_quiz_core::{
    create_mailing_system, create_snapshot_writer, firearms,
    quiz::IncorrectPlacement,
    testing::{fixtures, MockMailingList, MockSnapshotStorage, SeededRandom},
    ItemCatalog, ItemId, QuizSettings, QuizStore, SnapshotStorage, SqliteSnapshotStorage,
    StartOutcome,
};

fn id(raw: &str) -> ItemId {
    ItemId::from(raw)
}

fn fresh_store(catalog: ItemCatalog, seed: u64) -> QuizStore {
    QuizStore::new(Arc::new(catalog), QuizSettings::default())
        .with_random(Box::new(SeededRandom::new(seed)))
}

/// Apply one random operation. Returns true if it recorded an undo step.
fn random_op(store: &mut QuizStore, rng: &mut StdRng) -> bool {
    let ids = store.catalog().ids();
    let slot_count = store.board().slot_count();

    match rng.gen_range(0..5) {
        0 | 1 => {
            let item = &ids[rng.gen_range(0..ids.len())];
            store.place(item, rng.gen_range(0..slot_count)).unwrap();
            true
        }
        2 => {
            let item = &ids[rng.gen_range(0..ids.len())];
            store.select(Some(item)).unwrap();
            false
        }
        3 => {
            let slot = rng.gen_range(0..slot_count);
            let occupied = store.board().slots()[slot].is_some();
            store.remove_from_slot(slot).unwrap();
            occupied
        }
        _ => {
            store.undo();
            false
        }
    }
}

#[test]
fn test_two_item_scenario() {
    let mut store = QuizStore::new(Arc::new(fixtures::two_item_catalog()), QuizSettings::default());
    let initial = store.board().clone();

    store.place(&id("1"), 1).unwrap();
    store.place(&id("2"), 0).unwrap();
    let results = store.complete().clone();

    assert_eq!(results.correct_count, 0);
    assert_eq!(results.total_count, 2);
    assert_eq!(results.percentage, 0);
    assert_eq!(
        results
            .incorrect
            .iter()
            .map(IncorrectPlacement::slot)
            .collect::<Vec<_>>(),
        vec![0, 1]
    );

    assert!(store.undo());
    assert!(store.undo());
    assert_eq!(store.board(), &initial);
    assert_eq!(store.pool().len(), 2);
    assert!(store.slots().iter().all(Option::is_none));
}

#[test]
fn test_partition_holds_under_random_operations() {
    for seed in 0..20 {
        let mut store = fresh_store(firearms(), seed);
        store.shuffle_and_retry();
        let mut rng = StdRng::seed_from_u64(seed);

        for step in 0..300 {
            random_op(&mut store, &mut rng);
            assert!(
                store.partition_holds(),
                "partition broken at seed {} step {}",
                seed,
                step
            );
            if rng.gen_ratio(1, 100) {
                store.reset();
            }
        }
    }
}

#[test]
fn test_undo_reverses_any_sequence_within_capacity() {
    let capacity = QuizSettings::default().history_capacity;

    for seed in 0..20 {
        let mut store = fresh_store(firearms(), seed);
        store.shuffle_and_retry();
        let mut rng = StdRng::seed_from_u64(1000 + seed);

        // Warm up so the sequence starts from an arbitrary board
        for _ in 0..15 {
            random_op(&mut store, &mut rng);
        }

        let before = store.board().clone();
        let mut recorded = 0;
        while recorded < capacity {
            let ids = store.catalog().ids();
            let item = &ids[rng.gen_range(0..ids.len())];
            store.place(item, rng.gen_range(0..ids.len())).unwrap();
            recorded += 1;
        }

        for _ in 0..recorded {
            assert!(store.undo());
        }
        assert_eq!(store.board(), &before, "seed {}", seed);
    }
}

#[test]
fn test_scoring_ignores_pool_order() {
    let mut a = fresh_store(firearms(), 1);
    let mut b = fresh_store(firearms(), 2);
    a.shuffle_and_retry();
    b.shuffle_and_retry();

    for raw in ["3", "7", "9"] {
        let slot = a.catalog().get(&id(raw)).unwrap().correct_position;
        a.place(&id(raw), slot).unwrap();
        b.place(&id(raw), slot).unwrap();
    }
    a.place(&id("1"), 11).unwrap();
    b.place(&id("1"), 11).unwrap();

    let results = a.complete().clone();
    assert_eq!(results.correct_count, 3);
    assert_eq!(results.percentage, 25);
    assert_eq!(&results, b.complete());
}

#[test]
fn test_progress_survives_restart_with_sqlite() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("quiz.db");
    let catalog = Arc::new(firearms());

    let saved = {
        let storage = Arc::new(SqliteSnapshotStorage::new(&db_path).unwrap());
        let mut store = QuizStore::new(Arc::clone(&catalog), QuizSettings::default())
            .with_storage(storage)
            .with_random(Box::new(SeededRandom::new(5)));
        assert_eq!(store.start(), StartOutcome::Fresh);

        store.place(&id("12"), 11).unwrap();
        store.place(&id("4"), 0).unwrap();
        store.board().clone()
    };

    let storage = Arc::new(SqliteSnapshotStorage::new(&db_path).unwrap());
    let mut restored = QuizStore::new(catalog, QuizSettings::default()).with_storage(storage);

    assert_eq!(restored.start(), StartOutcome::Restored);
    assert_eq!(restored.board(), &saved);
    assert!(restored.partition_holds());
}

#[test]
fn test_progress_from_a_smaller_catalog_is_discarded() {
    let storage = Arc::new(MockSnapshotStorage::new());

    let mut small = QuizStore::new(
        Arc::new(fixtures::two_item_catalog()),
        QuizSettings::default(),
    )
    .with_storage(storage.clone());
    small.place(&id("1"), 0).unwrap();

    let mut large = QuizStore::new(Arc::new(firearms()), QuizSettings::default())
        .with_storage(storage.clone())
        .with_random(Box::new(SeededRandom::new(3)));

    assert_eq!(large.start(), StartOutcome::Fresh);
    assert_eq!(large.pool().len(), 12);
}

#[test]
fn test_completed_attempt_is_not_resumable() {
    let storage = Arc::new(MockSnapshotStorage::new());
    let catalog = Arc::new(firearms());

    let mut store = QuizStore::new(Arc::clone(&catalog), QuizSettings::default())
        .with_storage(storage.clone());
    store.place(&id("1"), 0).unwrap();
    store.complete();

    let mut next = QuizStore::new(catalog, QuizSettings::default())
        .with_storage(storage)
        .with_random(Box::new(SeededRandom::new(8)));
    assert_eq!(next.start(), StartOutcome::Fresh);
}

#[tokio::test]
async fn test_queued_storage_persists_in_background() {
    let inner = Arc::new(MockSnapshotStorage::new());
    let (queued, writer) = create_snapshot_writer(inner.clone(), 16);
    let writer_task = tokio::spawn(writer.run());

    let mut store = QuizStore::new(Arc::new(firearms()), QuizSettings::default())
        .with_storage(Arc::new(queued));
    store.place(&id("2"), 1).unwrap();
    store.place(&id("3"), 2).unwrap();
    drop(store);

    writer_task.await.unwrap();

    assert_eq!(inner.save_count(), 2);
    let payload = inner
        .load(timeline_quiz_core::quiz::DEFAULT_STORAGE_KEY)
        .unwrap()
        .expect("progress saved");
    assert!(payload.contains("\"3\""));
}

#[tokio::test]
async fn test_unlock_subscribes_through_worker() {
    let list = Arc::new(MockMailingList::new());
    let (handle, worker) = create_mailing_system(list.clone(), 8);
    let worker_task = tokio::spawn(worker.run());

    let mut store = QuizStore::new(Arc::new(firearms()), QuizSettings::default())
        .with_mailing_list(handle);
    store.complete();
    store.unlock("fan@example.com", true);
    drop(store);

    worker_task.await.unwrap();

    assert!(list.attempt_count().await == 1);
    assert_eq!(list.subscribed().await, vec!["fan@example.com".to_string()]);
}

#[tokio::test]
async fn test_failed_subscription_keeps_results_unlocked() {
    let list = Arc::new(MockMailingList::new());
    list.set_fail(true).await;
    let (handle, worker) = create_mailing_system(list.clone(), 8);
    let worker_task = tokio::spawn(worker.run());

    let mut store = QuizStore::new(Arc::new(firearms()), QuizSettings::default())
        .with_mailing_list(handle);
    store.complete();
    store.unlock("fan@example.com", true);

    assert!(store.is_unlocked());
    assert!(store.results().is_some());

    drop(store);
    worker_task.await.unwrap();
    assert_eq!(list.attempt_count().await, 1);
    assert!(list.subscribed().await.is_empty());
}
