use thiserror::Error;

use crate::catalog::ItemId;

/// Rejected quiz operations. These indicate caller bugs; state is never
/// modified when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),

    #[error("Slot {slot} is out of range (timeline has {slot_count} slots)")]
    SlotOutOfRange { slot: usize, slot_count: usize },

    #[error("No item is selected")]
    NothingSelected,
}
