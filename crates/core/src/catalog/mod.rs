//! Configured quiz items.

mod firearms;
mod loader;
mod types;

pub use firearms::firearms;
pub use loader::{load_catalog, load_catalog_from_str};
pub use types::{Item, ItemCatalog, ItemId};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read item file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse item file: {0}")]
    Parse(String),

    #[error("Item file defines no items")]
    Empty,

    #[error("Item file defines the same id twice")]
    DuplicateId,
}
