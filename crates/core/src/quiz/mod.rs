//! Placement state machine for one timeline quiz attempt.
//!
//! A [`QuizStore`] owns the board (pool plus timeline slots), the current
//! selection, a bounded undo history, the unlock gate and frozen results.
//! Every configured item is always in exactly one place: the pool or a single
//! slot.

mod board;
mod error;
mod history;
mod scoring;
pub mod snapshot;
mod store;

pub use board::{Board, Location};
pub use error::QuizError;
pub use history::History;
pub use scoring::{
    score, CorrectPlacement, IncorrectPlacement, Performance, QuizResults, Tier,
};
pub use snapshot::{PersistedSnapshot, SnapshotRejection, SNAPSHOT_VERSION};
pub use store::{QuizSettings, QuizStore, StartOutcome, DEFAULT_STORAGE_KEY};
