//! Live quiz sessions.
//!
//! Each session owns one [`QuizStore`] behind its own mutex, so operations
//! on a session are serialized while different sessions proceed in parallel.
//! Progress is keyed by session id in snapshot storage; opening a known id
//! after a restart resumes where it left off.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use timeline_quiz_core::{
    ItemCatalog, MailingListHandle, QuizSettings, QuizStore, SnapshotStorage, StartOutcome,
};

use crate::metrics::SESSIONS_ACTIVE;
use crate::state::AppState;

pub type SharedSession = Arc<Mutex<QuizStore>>;

/// A session handed out by [`SessionRegistry::open`].
pub struct OpenedSession {
    pub id: String,
    pub session: SharedSession,
    /// True if the session was already live or saved progress was restored.
    pub resumed: bool,
}

struct SessionEntry {
    session: SharedSession,
    /// Milliseconds since the registry epoch.
    last_touched: AtomicU64,
}

pub struct SessionRegistry {
    catalog: Arc<ItemCatalog>,
    settings: QuizSettings,
    storage: Arc<dyn SnapshotStorage>,
    mailing: MailingListHandle,
    epoch: Instant,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new(
        catalog: Arc<ItemCatalog>,
        settings: QuizSettings,
        storage: Arc<dyn SnapshotStorage>,
        mailing: MailingListHandle,
    ) -> Self {
        Self {
            catalog,
            settings,
            storage,
            mailing,
            epoch: Instant::now(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a live session and mark it as used.
    pub async fn get(&self, id: &str) -> Option<SharedSession> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(id)?;
        self.touch(entry, Instant::now());
        Some(Arc::clone(&entry.session))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Return the live session for `id`, or start one.
    ///
    /// Without an id a fresh one is generated. A new session restores any
    /// saved progress for its id, otherwise it is dealt a shuffled board.
    pub async fn open(&self, id: Option<String>) -> OpenedSession {
        let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        if let Some(session) = self.get(&id).await {
            return OpenedSession {
                id,
                session,
                resumed: true,
            };
        }

        // Restoring reads storage, so it runs before the map is locked.
        let settings = self
            .settings
            .clone()
            .with_storage_key(storage_key(&id));
        let mut store = QuizStore::new(Arc::clone(&self.catalog), settings)
            .with_storage(Arc::clone(&self.storage))
            .with_mailing_list(self.mailing.clone());
        let outcome = store.start();

        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        if let Some(entry) = sessions.get(&id) {
            // Another request opened the same id meanwhile.
            self.touch(entry, now);
            return OpenedSession {
                id,
                session: Arc::clone(&entry.session),
                resumed: true,
            };
        }

        let session = Arc::new(Mutex::new(store));
        sessions.insert(
            id.clone(),
            SessionEntry {
                session: Arc::clone(&session),
                last_touched: AtomicU64::new(self.millis_since_epoch(now)),
            },
        );
        SESSIONS_ACTIVE.set(sessions.len() as i64);

        info!(session_id = %id, outcome = ?outcome, "Session opened");

        OpenedSession {
            id,
            session,
            resumed: outcome == StartOutcome::Restored,
        }
    }

    /// Drop sessions nobody has used for `idle_timeout`. Returns how many
    /// were dropped.
    ///
    /// Progress is already in snapshot storage, so reopening an evicted id
    /// picks up where it left off.
    pub async fn evict_idle(&self, idle_timeout: Duration) -> usize {
        self.evict_idle_at(Instant::now(), idle_timeout).await
    }

    async fn evict_idle_at(&self, now: Instant, idle_timeout: Duration) -> usize {
        let now_ms = self.millis_since_epoch(now);
        let timeout_ms = idle_timeout.as_millis() as u64;

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let idle_ms = now_ms.saturating_sub(entry.last_touched.load(Ordering::Relaxed));
            let keep = idle_ms < timeout_ms;
            if !keep {
                debug!(session_id = %id, idle_ms, "Evicting idle session");
            }
            keep
        });
        let evicted = before - sessions.len();
        SESSIONS_ACTIVE.set(sessions.len() as i64);

        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    fn touch(&self, entry: &SessionEntry, now: Instant) {
        entry
            .last_touched
            .fetch_max(self.millis_since_epoch(now), Ordering::Relaxed);
    }

    fn millis_since_epoch(&self, at: Instant) -> u64 {
        at.saturating_duration_since(self.epoch).as_millis() as u64
    }
}

/// Periodically evict idle sessions until the task is aborted.
pub async fn run_idle_eviction(
    state: Arc<AppState>,
    idle_timeout: Duration,
    sweep_interval: Duration,
) {
    loop {
        tokio::time::sleep(sweep_interval).await;
        state.sessions().evict_idle(idle_timeout).await;
    }
}

/// Snapshot storage key for a session.
pub fn storage_key(session_id: &str) -> String {
    format!("session:{}", session_id)
}
