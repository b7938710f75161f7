//! The placement store: the only way quiz state changes.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use super::history::History;
use super::scoring::{score, QuizResults};
use super::snapshot;
use super::{Board, QuizError};
use crate::catalog::{Item, ItemCatalog, ItemId};
use crate::config::QuizConfig;
use crate::mailing::{MailingListHandle, SubscriptionRequest};
use crate::random::{shuffle, OsRandom, RandomSource};
use crate::storage::SnapshotStorage;

/// Storage key used when a store is not given one.
pub const DEFAULT_STORAGE_KEY: &str = "timeline-quiz:progress";

/// Tunables for one store.
#[derive(Debug, Clone)]
pub struct QuizSettings {
    pub history_capacity: usize,
    pub snapshot_ttl: Duration,
    pub storage_key: String,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self::from_config(&QuizConfig::default())
    }
}

impl QuizSettings {
    pub fn from_config(config: &QuizConfig) -> Self {
        Self {
            history_capacity: config.history_capacity,
            snapshot_ttl: Duration::hours(config.snapshot_ttl_hours.into()),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}

/// How [`QuizStore::start`] initialized the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Saved progress was restored.
    Restored,
    /// No usable progress was found; a shuffled board was dealt.
    Fresh,
}

/// Owns one quiz attempt.
///
/// All mutation goes through `&mut self` methods, so a store is single-writer
/// by construction. Persistence and mailing-list delivery are best-effort
/// side effects performed after the in-memory change has been made; their
/// failures are logged and never returned.
pub struct QuizStore {
    catalog: Arc<ItemCatalog>,
    settings: QuizSettings,
    board: Board,
    selection: Option<ItemId>,
    history: History,
    identity: Option<String>,
    results: Option<QuizResults>,
    storage: Option<Arc<dyn SnapshotStorage>>,
    random: Box<dyn RandomSource>,
    mailing: MailingListHandle,
}

impl QuizStore {
    /// A store with every item in the pool in configured order.
    ///
    /// Uses the OS random source, no storage and no mailing list until
    /// configured with the `with_*` methods. Call [`start`](Self::start) to
    /// restore progress or deal a shuffled board.
    pub fn new(catalog: Arc<ItemCatalog>, settings: QuizSettings) -> Self {
        let board = Board::new(catalog.ids(), catalog.len());
        let history = History::new(settings.history_capacity);
        Self {
            catalog,
            settings,
            board,
            selection: None,
            history,
            identity: None,
            results: None,
            storage: None,
            random: Box::new(OsRandom),
            mailing: MailingListHandle::disabled(),
        }
    }

    pub fn with_storage(mut self, storage: Arc<dyn SnapshotStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_random(mut self, random: Box<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn with_mailing_list(mut self, mailing: MailingListHandle) -> Self {
        self.mailing = mailing;
        self
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Unplaced items in presentation order.
    pub fn pool(&self) -> Vec<&Item> {
        self.board
            .pool()
            .iter()
            .filter_map(|id| self.catalog.get(id))
            .collect()
    }

    pub fn slots(&self) -> Vec<Option<&Item>> {
        self.board
            .slots()
            .iter()
            .map(|slot| slot.as_ref().and_then(|id| self.catalog.get(id)))
            .collect()
    }

    pub fn selection(&self) -> Option<&Item> {
        self.selection.as_ref().and_then(|id| self.catalog.get(id))
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn is_completed(&self) -> bool {
        self.results.is_some()
    }

    pub fn results(&self) -> Option<&QuizResults> {
        self.results.as_ref()
    }

    pub fn is_unlocked(&self) -> bool {
        self.identity.is_some()
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Whether every configured item is in exactly one place.
    pub fn partition_holds(&self) -> bool {
        if self.board.slot_count() != self.catalog.len() {
            return false;
        }

        let mut counts: HashMap<&ItemId, usize> = HashMap::new();
        for id in self.board.pool().iter().chain(self.board.slots().iter().flatten()) {
            *counts.entry(id).or_default() += 1;
        }

        counts.len() == self.catalog.len()
            && self
                .catalog
                .items()
                .iter()
                .all(|item| counts.get(&item.id) == Some(&1))
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Restore persisted progress, or deal a shuffled board if there is none
    /// worth restoring.
    pub fn start(&mut self) -> StartOutcome {
        match self.load_persisted() {
            Some(board) => {
                self.board = board;
                self.selection = None;
                self.history.clear();
                self.identity = None;
                self.results = None;
                info!(
                    key = %self.settings.storage_key,
                    placed = self.board.placed_count(),
                    "Restored quiz progress"
                );
                StartOutcome::Restored
            }
            None => {
                self.shuffle_and_retry();
                StartOutcome::Fresh
            }
        }
    }

    fn load_persisted(&self) -> Option<Board> {
        let storage = self.storage.as_ref()?;
        let key = &self.settings.storage_key;

        let payload = match storage.load(key) {
            Ok(payload) => payload?,
            Err(e) => {
                warn!(key = %key, "Failed to load quiz progress: {}", e);
                return None;
            }
        };

        match snapshot::decode(&payload, &self.catalog, Utc::now(), self.settings.snapshot_ttl) {
            Ok(board) => Some(board),
            Err(rejection) => {
                info!(key = %key, "Discarding saved quiz progress: {}", rejection);
                if let Err(e) = storage.clear(key) {
                    warn!(key = %key, "Failed to clear stale quiz progress: {}", e);
                }
                None
            }
        }
    }

    /// Start over with the pool in configured order.
    pub fn reset(&mut self) {
        self.reinitialize(self.catalog.ids());
        info!("Quiz reset");
    }

    /// Start over with the pool in a fresh random order.
    pub fn shuffle_and_retry(&mut self) {
        let mut ids = self.catalog.ids();
        shuffle(&mut ids, self.random.as_mut());
        self.reinitialize(ids);
        info!("Quiz reshuffled");
    }

    fn reinitialize(&mut self, pool: Vec<ItemId>) {
        self.board = Board::new(pool, self.catalog.len());
        self.selection = None;
        self.history.clear();
        self.identity = None;
        self.results = None;
        self.clear_persisted();
        debug_assert!(self.partition_holds());
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    /// Arm an item for placement, or clear the selection with `None`.
    /// Selecting the already-selected item clears it.
    pub fn select(&mut self, item: Option<&ItemId>) -> Result<(), QuizError> {
        match item {
            None => self.selection = None,
            Some(id) => {
                self.check_item(id)?;
                if self.selection.as_ref() == Some(id) {
                    self.selection = None;
                } else {
                    self.selection = Some(id.clone());
                }
            }
        }
        Ok(())
    }

    /// Put `item` into `slot`, moving it out of the pool or another slot.
    ///
    /// A different item already in `slot` goes back to the pool and is
    /// returned. Always records an undo step, even when the board ends up
    /// unchanged.
    pub fn place(&mut self, item: &ItemId, slot: usize) -> Result<Option<ItemId>, QuizError> {
        self.check_item(item)?;
        self.check_slot(slot)?;

        self.history.push(self.board.clone());
        let evicted = self.board.place(item, slot);
        self.selection = None;

        debug!(item = %item, slot, evicted = ?evicted, "Placed item");
        debug_assert!(self.partition_holds());

        self.persist();
        Ok(evicted)
    }

    /// Place the selected item into `slot`.
    pub fn place_selected(&mut self, slot: usize) -> Result<Option<ItemId>, QuizError> {
        let item = self.selection.clone().ok_or(QuizError::NothingSelected)?;
        self.place(&item, slot)
    }

    /// Move the occupant of `slot` back to the pool.
    ///
    /// Returns the removed item, or `None` (without an undo step) if the slot
    /// was already empty.
    pub fn remove_from_slot(&mut self, slot: usize) -> Result<Option<ItemId>, QuizError> {
        self.check_slot(slot)?;
        if self.board.slots()[slot].is_none() {
            return Ok(None);
        }

        self.history.push(self.board.clone());
        let removed = self.board.take_from_slot(slot);

        debug!(slot, item = ?removed, "Removed item from slot");
        debug_assert!(self.partition_holds());

        self.persist();
        Ok(removed)
    }

    /// Restore the board from before the last placement or removal.
    ///
    /// Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.pop() else {
            return false;
        };

        self.board = previous;
        self.selection = None;

        debug!(remaining = self.history.len(), "Undid last move");
        debug_assert!(self.partition_holds());

        self.persist();
        true
    }

    // ------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------

    /// Score the current slots and freeze the results.
    ///
    /// Empty slots count as misses, so this is valid at any time. Saved
    /// progress is cleared: a scored attempt is not resumable.
    pub fn complete(&mut self) -> &QuizResults {
        let results = score(self.board.slots(), &self.catalog);
        info!(
            correct = results.correct_count,
            total = results.total_count,
            percentage = results.percentage,
            tier = results.tier.as_str(),
            "Quiz completed"
        );

        self.clear_persisted();
        self.results.insert(results)
    }

    /// Record the identity token that gates the results.
    ///
    /// With `opt_in`, a subscription is handed to the mailing list without
    /// waiting for it. The unlock stands whether or not that succeeds.
    ///
    /// Returns true if a subscription request was queued.
    pub fn unlock(&mut self, identity: impl Into<String>, opt_in: bool) -> bool {
        let identity = identity.into();
        self.identity = Some(identity.clone());
        info!(opt_in, "Results unlocked");

        if !opt_in {
            return false;
        }

        let queued = self.mailing.try_submit(SubscriptionRequest {
            email: identity,
            opt_in,
        });
        if !queued {
            warn!("Subscription request was not queued");
        }
        queued
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn check_item(&self, id: &ItemId) -> Result<(), QuizError> {
        if self.catalog.contains(id) {
            Ok(())
        } else {
            Err(QuizError::UnknownItem(id.clone()))
        }
    }

    fn check_slot(&self, slot: usize) -> Result<(), QuizError> {
        let slot_count = self.board.slot_count();
        if slot < slot_count {
            Ok(())
        } else {
            Err(QuizError::SlotOutOfRange { slot, slot_count })
        }
    }

    fn persist(&self) {
        if self.is_completed() {
            return;
        }
        let Some(storage) = &self.storage else {
            return;
        };

        let payload = match snapshot::encode(&self.board, Utc::now()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to encode quiz progress: {}", e);
                return;
            }
        };

        if let Err(e) = storage.save(&self.settings.storage_key, &payload) {
            warn!(key = %self.settings.storage_key, "Failed to save quiz progress: {}", e);
        }
    }

    fn clear_persisted(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        if let Err(e) = storage.clear(&self.settings.storage_key) {
            warn!(key = %self.settings.storage_key, "Failed to clear quiz progress: {}", e);
        }
    }
}
