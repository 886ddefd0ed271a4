//! Title matching and tag-based recommendation for an anime catalog.
//!
//! [`Engine`] exposes the three query operations over any [`CatalogStore`]:
//! fuzzy title lookup that sees through season-suffix spellings, tag-overlap
//! ranking, and "more like this" seeded from a title.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod normalize;
pub mod recommend;
pub mod resolver;
pub mod season;
pub mod similarity;
pub mod storage;
pub mod tags;

pub use catalog::{CatalogStore, MemoryCatalog};
pub use config::{AppConfig, EngineConfig};
pub use engine::Engine;
pub use error::OsusumeError;
pub use storage::Storage;
