use std::cmp::Ordering;

use crate::catalog::CatalogStore;
use crate::error::OsusumeError;
use crate::models::{CatalogFilter, ScoredTitleMatch};
use crate::normalize::extract_base_title;
use crate::season::season_filter;
use crate::similarity::{similarity_breakdown, SimilarityBreakdown};

/// Default minimum similarity for a title match.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;

/// Parameters of one title lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleQuery<'a> {
    pub title: &'a str,
    /// Rows scoring below this are dropped.
    pub threshold: f64,
    pub limit: usize,
    /// `YYYY-Season`; anything unrecognized searches every season.
    pub season: Option<&'a str>,
}

impl<'a> TitleQuery<'a> {
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            limit: 10,
            season: None,
        }
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn season(mut self, season: Option<&'a str>) -> Self {
        self.season = season;
        self
    }
}

/// Find the catalog rows whose titles best match `query.title`.
///
/// Every row (of the requested season, if any) is scored; rows at or above
/// the threshold are ranked by score, then by how closely the
/// season-normalized titles agree, then by storage order. A blank query
/// title matches nothing.
pub fn query_by_title<S>(
    store: &S,
    query: &TitleQuery<'_>,
) -> Result<Vec<ScoredTitleMatch>, OsusumeError>
where
    S: CatalogStore + ?Sized,
{
    if query.title.trim().is_empty() || query.limit == 0 {
        return Ok(Vec::new());
    }

    let filter = CatalogFilter {
        season: season_filter(query.season),
        min_rating: None,
    };
    let rows = store.fetch_all(&filter)?;
    let scanned = rows.len();

    let mut scored: Vec<(SimilarityBreakdown, ScoredTitleMatch)> = rows
        .into_iter()
        .filter_map(|item| {
            let breakdown = similarity_breakdown(query.title, &item.title);
            // NaN thresholds keep nothing.
            let keep = breakdown.score >= query.threshold;
            if !keep {
                return None;
            }
            let matched_title = item.title.clone();
            let base_title = extract_base_title(&matched_title);
            Some((
                breakdown,
                ScoredTitleMatch {
                    item,
                    similarity_score: breakdown.score,
                    query_title: query.title.to_string(),
                    matched_title,
                    base_title,
                },
            ))
        })
        .collect();

    scored.sort_by(|(a, _), (b, _)| rank(a, b));
    scored.truncate(query.limit);

    tracing::debug!(
        scanned,
        matched = scored.len(),
        best = ?scored.first().map(|(b, _)| b.score),
        "Title query scored"
    );

    Ok(scored.into_iter().map(|(_, matched)| matched).collect())
}

/// Descending by score, ties broken by the normalized-title ratio.
fn rank(a: &SimilarityBreakdown, b: &SimilarityBreakdown) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.normalized.total_cmp(&a.normalized))
}
