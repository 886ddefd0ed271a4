//! The catalog store seam.
//!
//! The engine only ever reads catalog rows through [`CatalogStore`]. The
//! SQLite adapter lives in [`crate::storage`]; [`MemoryCatalog`] backs tests
//! and callers that already hold their rows.

use std::collections::BTreeSet;

use crate::error::OsusumeError;
use crate::models::{CatalogFilter, CatalogItem, CatalogStats};

/// Number of entries reported in [`CatalogStats::top_rated`].
pub const TOP_RATED_COUNT: usize = 5;

/// Read access to the anime catalog.
pub trait CatalogStore {
    /// All rows passing `filter`, in storage order.
    fn fetch_all(&self, filter: &CatalogFilter) -> Result<Vec<CatalogItem>, OsusumeError>;

    /// Every distinct genre in the catalog, sorted.
    fn available_genres(&self) -> Result<Vec<String>, OsusumeError> {
        let items = self.fetch_all(&CatalogFilter::default())?;
        Ok(collect_genres(&items))
    }

    /// Row count, rating spread and top-rated titles.
    fn statistics(&self) -> Result<CatalogStats, OsusumeError> {
        let items = self.fetch_all(&CatalogFilter::default())?;
        Ok(compute_stats(&items))
    }
}

impl<S: CatalogStore + ?Sized> CatalogStore for &S {
    fn fetch_all(&self, filter: &CatalogFilter) -> Result<Vec<CatalogItem>, OsusumeError> {
        (**self).fetch_all(filter)
    }

    fn available_genres(&self) -> Result<Vec<String>, OsusumeError> {
        (**self).available_genres()
    }

    fn statistics(&self) -> Result<CatalogStats, OsusumeError> {
        (**self).statistics()
    }
}

/// A catalog held entirely in memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    items: Vec<CatalogItem>,
}

impl MemoryCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, item: CatalogItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<CatalogItem> for MemoryCatalog {
    fn from_iter<I: IntoIterator<Item = CatalogItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl CatalogStore for MemoryCatalog {
    fn fetch_all(&self, filter: &CatalogFilter) -> Result<Vec<CatalogItem>, OsusumeError> {
        Ok(self
            .items
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }
}

fn collect_genres(items: &[CatalogItem]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.genres.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn compute_stats(items: &[CatalogItem]) -> CatalogStats {
    let mut rated: Vec<(&str, f64)> = items
        .iter()
        .filter_map(|item| item.rating.map(|r| (item.title.as_str(), r)))
        .collect();

    let (avg_rating, min_rating, max_rating) = if rated.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        let sum: f64 = rated.iter().map(|&(_, r)| r).sum();
        let min = rated.iter().map(|&(_, r)| r).fold(f64::INFINITY, f64::min);
        let max = rated.iter().map(|&(_, r)| r).fold(f64::NEG_INFINITY, f64::max);
        (sum / rated.len() as f64, min, max)
    };

    rated.sort_by(|a, b| b.1.total_cmp(&a.1));
    let top_rated = rated
        .into_iter()
        .take(TOP_RATED_COUNT)
        .map(|(title, r)| (title.to_string(), r))
        .collect();

    CatalogStats {
        total_count: items.len(),
        avg_rating,
        min_rating,
        max_rating,
        top_rated,
        available_genres: collect_genres(items),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new(vec![
            CatalogItem::new(1, "Frieren")
                .with_rating(9.3)
                .with_season("2023-Fall")
                .with_genres(["Adventure", "Fantasy"]),
            CatalogItem::new(2, "Dungeon Meshi")
                .with_rating(8.6)
                .with_season("2024-Winter")
                .with_genres(["Fantasy", "Comedy", "Fantasy"]),
            CatalogItem::new(3, "Unrated Pilot").with_genres(["Drama"]),
        ])
    }

    #[test]
    fn fetch_all_preserves_order() {
        let ids: Vec<i64> = catalog()
            .fetch_all(&CatalogFilter::default())
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn fetch_all_applies_filter() {
        let rows = catalog()
            .fetch_all(&CatalogFilter {
                season: Some("2024-Winter".into()),
                min_rating: Some(5.0),
            })
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 2);
    }

    #[test]
    fn genres_sorted_and_deduplicated() {
        assert_eq!(
            catalog().available_genres().unwrap(),
            vec!["Adventure", "Comedy", "Drama", "Fantasy"]
        );
    }

    #[test]
    fn stats_over_rated_rows() {
        let stats = catalog().statistics().unwrap();
        assert_eq!(stats.total_count, 3);
        assert!((stats.avg_rating - 8.95).abs() < 1e-9);
        assert_eq!(stats.min_rating, 8.6);
        assert_eq!(stats.max_rating, 9.3);
        assert_eq!(stats.top_rated[0], ("Frieren".to_string(), 9.3));
        assert_eq!(stats.top_rated.len(), 2);
    }

    #[test]
    fn stats_empty_catalog() {
        let stats = MemoryCatalog::default().statistics().unwrap();
        assert_eq!(stats, CatalogStats::default());
    }
}
