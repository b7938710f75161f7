//! Scoring of a finished (or abandoned) timeline.

use serde::{Deserialize, Serialize};

use crate::catalog::{ItemCatalog, ItemId};

/// Rank shown alongside the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Novice,
    Marksman,
    Sharpshooter,
    Historian,
}

impl Tier {
    pub fn for_score(correct: usize, total: usize) -> Self {
        if total > 0 && correct == total {
            Tier::Historian
        } else if correct >= 9 {
            Tier::Sharpshooter
        } else if correct >= 5 {
            Tier::Marksman
        } else {
            Tier::Novice
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Novice => "Novice",
            Tier::Marksman => "Marksman",
            Tier::Sharpshooter => "Sharpshooter",
            Tier::Historian => "Historian",
        }
    }
}

/// Band of the percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Performance {
    NeedsWork,
    Fair,
    Good,
    Great,
    Excellent,
}

impl Performance {
    pub fn for_percentage(percentage: u32) -> Self {
        match percentage {
            90.. => Performance::Excellent,
            75..=89 => Performance::Great,
            60..=74 => Performance::Good,
            45..=59 => Performance::Fair,
            _ => Performance::NeedsWork,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Performance::Excellent => "Excellent knowledge of US firearms history!",
            Performance::Great => "Great understanding of the timeline!",
            Performance::Good => "Good grasp of firearms chronology!",
            Performance::Fair => "Keep studying US firearms history!",
            Performance::NeedsWork => "Time to brush up on firearms history!",
        }
    }
}

/// An item placed on its own slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectPlacement {
    pub item_id: ItemId,
    pub name: String,
    pub slot: usize,
    pub year: i32,
}

/// A slot that did not hold its correct item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IncorrectPlacement {
    /// The slot holds an item that belongs elsewhere.
    Misplaced {
        item_id: ItemId,
        name: String,
        slot: usize,
        correct_slot: usize,
        correct_year: i32,
        description: String,
    },
    /// Nothing was placed in the slot.
    Empty {
        slot: usize,
        expected_item_id: Option<ItemId>,
    },
}

impl IncorrectPlacement {
    pub fn slot(&self) -> usize {
        match self {
            IncorrectPlacement::Misplaced { slot, .. } | IncorrectPlacement::Empty { slot, .. } => {
                *slot
            }
        }
    }
}

/// Frozen outcome of an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResults {
    pub correct_count: usize,
    pub total_count: usize,
    /// `round(100 * correct_count / total_count)`, 0 for an empty catalog.
    pub percentage: u32,
    pub tier: Tier,
    pub performance: Performance,
    pub correct: Vec<CorrectPlacement>,
    pub incorrect: Vec<IncorrectPlacement>,
}

/// Score a slot sequence against the catalog.
///
/// Every slot index is judged; empty slots and ids outside the catalog are
/// misses. The total is the catalog size, so a short `slots` slice counts its
/// missing tail as misses too.
pub fn score(slots: &[Option<ItemId>], catalog: &ItemCatalog) -> QuizResults {
    let total_count = catalog.len();
    let mut correct = Vec::new();
    let mut incorrect = Vec::new();

    for slot in 0..total_count {
        let placed = slots
            .get(slot)
            .and_then(Option::as_ref)
            .and_then(|id| catalog.get(id));

        match placed {
            Some(item) if item.correct_position == slot => correct.push(CorrectPlacement {
                item_id: item.id.clone(),
                name: item.name.clone(),
                slot,
                year: item.year,
            }),
            Some(item) => incorrect.push(IncorrectPlacement::Misplaced {
                item_id: item.id.clone(),
                name: item.name.clone(),
                slot,
                correct_slot: item.correct_position,
                correct_year: item.year,
                description: item.description.clone(),
            }),
            None => incorrect.push(IncorrectPlacement::Empty {
                slot,
                expected_item_id: catalog.expected_at(slot).map(|item| item.id.clone()),
            }),
        }
    }

    let correct_count = correct.len();
    let percentage = percentage(correct_count, total_count);
    QuizResults {
        correct_count,
        total_count,
        percentage,
        tier: Tier::for_score(correct_count, total_count),
        performance: Performance::for_percentage(percentage),
        correct,
        incorrect,
    }
}

fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * correct as f64 / total as f64).round() as u32
}
