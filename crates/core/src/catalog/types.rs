//! Item and catalog types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a quiz item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A quiz item as defined by configuration data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Ground-truth timeline slot (0-based).
    pub correct_position: usize,
    pub year: i32,
}

/// The configured item set for one quiz.
///
/// Slot count is the number of items. Configurations whose correct positions
/// are not a permutation of `0..len` are accepted; scoring treats the gaps as
/// misses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCatalog {
    items: Vec<Item>,
}

impl ItemCatalog {
    /// Build a catalog from items in presentation order.
    ///
    /// Returns `None` if two items share an id.
    pub fn new(items: Vec<Item>) -> Option<Self> {
        let mut seen = std::collections::HashSet::new();
        if items.iter().all(|item| seen.insert(item.id.clone())) {
            Some(Self { items })
        } else {
            None
        }
    }

    /// Build a catalog from data known to have unique ids.
    pub(crate) fn from_trusted(items: Vec<Item>) -> Self {
        debug_assert!(Self::new(items.clone()).is_some(), "duplicate item ids");
        Self { items }
    }

    /// Number of items, which is also the number of timeline slots.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.get(id).is_some()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Item ids in configured order.
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }

    /// The item whose correct position is `slot`, if exactly one is configured there.
    pub fn expected_at(&self, slot: usize) -> Option<&Item> {
        let mut matches = self.items.iter().filter(|item| item.correct_position == slot);
        match (matches.next(), matches.next()) {
            (Some(item), None) => Some(item),
            _ => None,
        }
    }
}
