//! Built-in American firearms timeline.

use super::{Item, ItemCatalog, ItemId};

const FIREARMS: &[(&str, &str, &str, i32)] = &[
    ("1", "Kentucky Long Rifle", "American frontier hunting rifle", 1750),
    ("2", "Colt Walker Revolver", "Powerful six-shooter for Texas Rangers", 1847),
    ("3", "Spencer Repeating Rifle", "Civil War seven-shot repeater", 1860),
    ("4", "Winchester Rifle", "The Gun That Won the West", 1873),
    ("5", "Colt Single Action Army", "Peacemaker revolver of the Old West", 1873),
    ("6", "Winchester Carbine", "Popular lever-action hunting rifle", 1894),
    ("7", "Colt Pistol", "Legendary military semi-automatic pistol", 1911),
    ("8", "Thompson Submachine Gun", "Tommy Gun of the Prohibition era", 1918),
    ("9", "M1 Garand", "WWII semi-automatic battle rifle", 1936),
    ("10", "ArmaLite AR-15", "Modern sporting rifle platform", 1959),
    ("11", "Ruger 10/22", "Popular .22 caliber rifle", 1964),
    ("12", "Smith & Wesson M&P9", "Military & Police 9mm pistol", 2005),
];

/// The twelve-item firearms timeline, in chronological order.
pub fn firearms() -> ItemCatalog {
    let items = FIREARMS
        .iter()
        .enumerate()
        .map(|(position, (id, name, description, year))| Item {
            id: ItemId::from(*id),
            name: (*name).to_string(),
            description: (*description).to_string(),
            correct_position: position,
            year: *year,
        })
        .collect();

    ItemCatalog::from_trusted(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firearms_is_a_permutation() {
        let catalog = firearms();
        assert_eq!(catalog.len(), 12);

        let mut positions: Vec<usize> = catalog.items().iter().map(|i| i.correct_position).collect();
        positions.sort_unstable();
        assert_eq!(positions, (0..12).collect::<Vec<_>>());

        for slot in 0..12 {
            assert!(catalog.expected_at(slot).is_some());
        }
    }
}
