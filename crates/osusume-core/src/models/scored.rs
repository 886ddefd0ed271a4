use serde::Serialize;

use super::CatalogItem;

/// A catalog item matched by title, with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTitleMatch {
    #[serde(flatten)]
    pub item: CatalogItem,
    /// Always within 0.0..=1.0.
    pub similarity_score: f64,
    pub query_title: String,
    pub matched_title: String,
    /// `matched_title` with season and subtitle suffixes stripped.
    pub base_title: String,
}

/// A catalog item matched by tag overlap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTagMatch {
    #[serde(flatten)]
    pub item: CatalogItem,
    /// Query tags found on the item, in query order, as the caller spelled them.
    pub matched_tags: Vec<String>,
    /// Never zero for an item that made it into a result.
    pub matched_tag_count: usize,
    pub tag_bonus_score: f64,
    pub base_rating: f64,
    /// `base_rating + tag_bonus_score`.
    pub total_score: f64,
}
