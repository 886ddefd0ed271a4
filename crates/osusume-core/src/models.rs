mod catalog;
mod scored;

pub use catalog::{CatalogFilter, CatalogItem, CatalogStats};
pub use scored::{ScoredTagMatch, ScoredTitleMatch};
