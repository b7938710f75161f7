//! Quiz session API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use timeline_quiz_core::{validate_email, ItemId, QuizError, QuizResults, QuizStore};

use super::handlers::ItemView;
use crate::metrics::{QUIZ_COMPLETIONS_TOTAL, SUBSCRIPTIONS_DROPPED_TOTAL, UNLOCKS_TOTAL};
use crate::sessions::SharedSession;
use crate::state::AppState;

static SESSION_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap());

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for opening a session
#[derive(Debug, Default, Deserialize)]
pub struct OpenSessionBody {
    /// Resume this session if it exists; generated when omitted
    pub session_id: Option<String>,
}

/// Request body for selecting an item
#[derive(Debug, Deserialize)]
pub struct SelectBody {
    /// Item to arm, or null to clear the selection
    pub item_id: Option<String>,
}

/// Request body for placing an item
#[derive(Debug, Deserialize)]
pub struct PlaceBody {
    /// Item to place; the current selection when omitted
    pub item_id: Option<String>,
    pub slot: usize,
}

/// Request body for unlocking results
#[derive(Debug, Deserialize)]
pub struct UnlockBody {
    pub email: String,
    /// Opt in to the mailing list
    #[serde(default)]
    pub subscribe: bool,
}

/// Player-facing view of one session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub pool: Vec<ItemView>,
    pub slots: Vec<Option<ItemView>>,
    pub selection: Option<ItemId>,
    pub history_len: usize,
    pub completed: bool,
    pub unlocked: bool,
    /// Present once the attempt is completed and unlocked.
    pub results: Option<QuizResults>,
}

impl SessionView {
    pub fn new(session_id: &str, store: &QuizStore) -> Self {
        let results = if store.is_unlocked() {
            store.results().cloned()
        } else {
            None
        };

        Self {
            session_id: session_id.to_string(),
            pool: store.pool().into_iter().map(ItemView::from).collect(),
            slots: store
                .slots()
                .into_iter()
                .map(|slot| slot.map(ItemView::from))
                .collect(),
            selection: store.selection().map(|item| item.id.clone()),
            history_len: store.history_len(),
            completed: store.is_completed(),
            unlocked: store.is_unlocked(),
            results,
        }
    }
}

/// Response for opening a session
#[derive(Debug, Serialize)]
pub struct OpenSessionResponse {
    /// True if an existing session or saved progress was picked up
    pub resumed: bool,
    #[serde(flatten)]
    pub session: SessionView,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct SessionErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<SessionErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(SessionErrorResponse {
            error: message.into(),
        }),
    )
}

fn rejected(e: QuizError) -> ApiError {
    error(StatusCode::BAD_REQUEST, e.to_string())
}

async fn find_session(state: &AppState, id: &str) -> Result<SharedSession, ApiError> {
    state
        .sessions()
        .get(id)
        .await
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("Session not found: {}", id)))
}

// ============================================================================
// Handlers
// ============================================================================

/// Open a session, resuming saved progress for a known id
pub async fn open_session(
    State(state): State<Arc<AppState>>,
    body: Option<Json<OpenSessionBody>>,
) -> Result<(StatusCode, Json<OpenSessionResponse>), ApiError> {
    let requested = body.and_then(|Json(b)| b.session_id);
    if let Some(id) = &requested {
        if !SESSION_ID_PATTERN.is_match(id) {
            return Err(error(
                StatusCode::BAD_REQUEST,
                "session_id must be 1-64 letters, digits, '-' or '_'",
            ));
        }
    }

    let opened = state.sessions().open(requested).await;
    let store = opened.session.lock().await;
    let status = if opened.resumed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((
        status,
        Json(OpenSessionResponse {
            resumed: opened.resumed,
            session: SessionView::new(&opened.id, &store),
        }),
    ))
}

/// Get a session by ID
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, &id).await?;
    let store = session.lock().await;
    Ok(Json(SessionView::new(&id, &store)))
}

/// Arm or clear the selection
pub async fn select(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<SelectBody>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, &id).await?;
    let mut store = session.lock().await;

    let item = body.item_id.map(ItemId::from);
    store.select(item.as_ref()).map_err(rejected)?;

    Ok(Json(SessionView::new(&id, &store)))
}

/// Place an item (or the selection) into a slot
pub async fn place(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<PlaceBody>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, &id).await?;
    let mut store = session.lock().await;

    let placed = match body.item_id {
        Some(item) => store.place(&ItemId::from(item), body.slot),
        None => store.place_selected(body.slot),
    };
    placed.map_err(rejected)?;

    Ok(Json(SessionView::new(&id, &store)))
}

/// Return a slot's occupant to the pool
pub async fn remove_from_slot(
    State(state): State<Arc<AppState>>,
    Path((id, slot)): Path<(String, usize)>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, &id).await?;
    let mut store = session.lock().await;

    store.remove_from_slot(slot).map_err(rejected)?;

    Ok(Json(SessionView::new(&id, &store)))
}

/// Undo the last placement or removal (no-op when there is none)
pub async fn undo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, &id).await?;
    let mut store = session.lock().await;

    store.undo();

    Ok(Json(SessionView::new(&id, &store)))
}

/// Score the current timeline
pub async fn complete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, &id).await?;
    let mut store = session.lock().await;

    let tier = store.complete().tier;
    QUIZ_COMPLETIONS_TOTAL
        .with_label_values(&[tier.as_str()])
        .inc();

    Ok(Json(SessionView::new(&id, &store)))
}

/// Start over with items in configured order
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, &id).await?;
    let mut store = session.lock().await;

    store.reset();

    Ok(Json(SessionView::new(&id, &store)))
}

/// Start over with a freshly shuffled pool
pub async fn shuffle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, &id).await?;
    let mut store = session.lock().await;

    store.shuffle_and_retry();

    Ok(Json(SessionView::new(&id, &store)))
}

/// Unlock results with an email address
pub async fn unlock(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UnlockBody>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, &id).await?;

    let email = body.email.trim();
    if let Err(e) = validate_email(email) {
        return Err(error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()));
    }

    let mut store = session.lock().await;
    let queued = store.unlock(email, body.subscribe);

    UNLOCKS_TOTAL
        .with_label_values(&[if body.subscribe { "true" } else { "false" }])
        .inc();
    if body.subscribe && !queued {
        SUBSCRIPTIONS_DROPPED_TOTAL.inc();
    }

    Ok(Json(SessionView::new(&id, &store)))
}
