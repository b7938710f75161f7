//! Where every item currently sits.

use crate::catalog::ItemId;

/// Location of an item on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Pool,
    Slot(usize),
}

/// The `(pool, slots)` pair. Also the unit of undo history and persistence.
///
/// Mutations keep every id in exactly one place as long as the board started
/// that way; the store is responsible for only admitting configured ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pool: Vec<ItemId>,
    slots: Vec<Option<ItemId>>,
}

impl Board {
    /// A board with every id in the pool and `slot_count` empty slots.
    pub fn new(pool: Vec<ItemId>, slot_count: usize) -> Self {
        Self {
            pool,
            slots: vec![None; slot_count],
        }
    }

    pub(crate) fn from_parts(pool: Vec<ItemId>, slots: Vec<Option<ItemId>>) -> Self {
        Self { pool, slots }
    }

    /// Unplaced ids in presentation order.
    pub fn pool(&self) -> &[ItemId] {
        &self.pool
    }

    pub fn slots(&self) -> &[Option<ItemId>] {
        &self.slots
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn location(&self, id: &ItemId) -> Option<Location> {
        if self.pool.contains(id) {
            return Some(Location::Pool);
        }
        self.slots
            .iter()
            .position(|slot| slot.as_ref() == Some(id))
            .map(Location::Slot)
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn placed_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Put `id` into `slot`, taking it from wherever it was.
    ///
    /// A different occupant of `slot` goes to the end of the pool and is
    /// returned. Placing an item onto its own slot leaves the board unchanged.
    pub(crate) fn place(&mut self, id: &ItemId, slot: usize) -> Option<ItemId> {
        self.pool.retain(|pooled| pooled != id);
        for occupant in self.slots.iter_mut() {
            if occupant.as_ref() == Some(id) {
                *occupant = None;
            }
        }

        let evicted = self.slots[slot].replace(id.clone());
        if let Some(evicted) = &evicted {
            self.pool.push(evicted.clone());
        }
        evicted
    }

    /// Empty `slot`, moving its occupant to the end of the pool.
    pub(crate) fn take_from_slot(&mut self, slot: usize) -> Option<ItemId> {
        let occupant = self.slots[slot].take()?;
        self.pool.push(occupant.clone());
        Some(occupant)
    }
}
