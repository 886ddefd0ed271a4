use std::collections::HashSet;

use crate::catalog::CatalogStore;
use crate::error::OsusumeError;
use crate::models::{CatalogFilter, ScoredTagMatch};
use crate::season::season_filter;

/// Parameters of one tag-based recommendation.
#[derive(Debug, Clone, PartialEq)]
pub struct TagQuery<'a> {
    /// Matched case-insensitively; repeats count once.
    pub tags: &'a [String],
    pub limit: usize,
    /// Added to the rating once per matched tag.
    pub tag_bonus: f64,
    /// Rows rated below this, or unrated, are skipped.
    pub min_rating: f64,
    pub season: Option<&'a str>,
}

/// Rank catalog rows by `rating + matched_tags * tag_bonus`.
///
/// Rows sharing no tag with the query are dropped, so an empty tag list
/// always yields an empty result. Ties keep storage order.
pub fn query_by_tags<S>(
    store: &S,
    query: &TagQuery<'_>,
) -> Result<Vec<ScoredTagMatch>, OsusumeError>
where
    S: CatalogStore + ?Sized,
{
    let wanted = dedup_tags(query.tags);
    if wanted.is_empty() || query.limit == 0 {
        return Ok(Vec::new());
    }

    let filter = CatalogFilter {
        season: season_filter(query.season),
        min_rating: Some(query.min_rating),
    };
    let rows = store.fetch_all(&filter)?;
    let scanned = rows.len();

    let mut results: Vec<ScoredTagMatch> = rows
        .into_iter()
        .filter_map(|item| {
            let genres: HashSet<String> = item
                .genres
                .iter()
                .map(|g| g.trim().to_lowercase())
                .collect();
            let matched_tags: Vec<String> = wanted
                .iter()
                .filter(|(lower, _)| genres.contains(lower))
                .map(|(_, original)| original.to_string())
                .collect();
            if matched_tags.is_empty() {
                return None;
            }

            let matched_tag_count = matched_tags.len();
            let tag_bonus_score = matched_tag_count as f64 * query.tag_bonus;
            let base_rating = item.rating.unwrap_or(0.0);
            Some(ScoredTagMatch {
                item,
                matched_tags,
                matched_tag_count,
                tag_bonus_score,
                base_rating,
                total_score: base_rating + tag_bonus_score,
            })
        })
        .collect();

    results.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));
    results.truncate(query.limit);

    tracing::debug!(
        tags = wanted.len(),
        scanned,
        matched = results.len(),
        "Tag query scored"
    );

    Ok(results)
}

/// Trim and lowercase each tag, keeping the first spelling of each.
///
/// Item genres get the same trim, so `" Action"` and `"action "` are one tag.
fn dedup_tags(tags: &[String]) -> Vec<(String, &str)> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .filter_map(|t| {
            let lower = t.to_lowercase();
            seen.insert(lower.clone()).then_some((lower, t))
        })
        .collect()
}
