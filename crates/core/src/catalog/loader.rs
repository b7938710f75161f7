use std::path::Path;

use serde::Deserialize;

use super::{CatalogError, Item, ItemCatalog};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    items: Vec<Item>,
}

/// Load an item catalog from a TOML file containing `[[items]]` tables.
pub fn load_catalog(path: &Path) -> Result<ItemCatalog, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_catalog_from_str(&contents)
}

/// Parse an item catalog from a TOML string.
pub fn load_catalog_from_str(toml_str: &str) -> Result<ItemCatalog, CatalogError> {
    let file: CatalogFile =
        toml::from_str(toml_str).map_err(|e| CatalogError::Parse(e.to_string()))?;

    if file.items.is_empty() {
        return Err(CatalogError::Empty);
    }

    let slots = file.items.len();
    for item in &file.items {
        if item.correct_position >= slots {
            tracing::warn!(
                item = %item.id,
                correct_position = item.correct_position,
                slots,
                "Item correct position is outside the timeline, it can never score"
            );
        }
    }

    ItemCatalog::new(file.items).ok_or(CatalogError::DuplicateId)
}
