use serde::{Deserialize, Serialize};

/// One recommendable catalog entry, as read from the store.
///
/// Only `title`, `season`, `rating` and `genres` are examined by the
/// matching engine; everything else is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    /// Canonical `"<year>-<Winter|Spring|Summer|Fall>"`, or `None` when unscheduled.
    pub season: Option<String>,
    pub episodes: Option<u32>,
    pub rating: Option<f64>,
    pub viewers_count: Option<i64>,
    /// Duplicates are allowed here; matching treats them as a set.
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    pub synopsis: Option<String>,
    pub image_path: Option<String>,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub disliked: bool,
}

impl CatalogItem {
    /// A bare item with only a title; everything else empty.
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            season: None,
            episodes: None,
            rating: None,
            viewers_count: None,
            genres: Vec::new(),
            platforms: Vec::new(),
            synopsis: None,
            image_path: None,
            liked: false,
            disliked: false,
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_season(mut self, season: impl Into<String>) -> Self {
        self.season = Some(season.into());
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }
}

/// Pre-filter applied by the catalog store before scoring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogFilter {
    /// Exact match on the canonical season code.
    pub season: Option<String>,
    /// Rows with no rating never pass a rating filter.
    pub min_rating: Option<f64>,
}

impl CatalogFilter {
    pub fn matches(&self, item: &CatalogItem) -> bool {
        if let Some(season) = &self.season {
            if item.season.as_deref() != Some(season.as_str()) {
                return false;
            }
        }
        if let Some(min) = self.min_rating {
            match item.rating {
                Some(rating) if rating >= min => {}
                _ => return false,
            }
        }
        true
    }
}

/// Aggregate view of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_count: usize,
    pub avg_rating: f64,
    pub min_rating: f64,
    pub max_rating: f64,
    /// Up to five `(title, rating)` pairs, best first.
    pub top_rated: Vec<(String, f64)>,
    pub available_genres: Vec<String>,
}
