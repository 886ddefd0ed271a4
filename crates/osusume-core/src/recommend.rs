//! "More like this": recommendations seeded from one catalog title.
//!
//! The anchor title is resolved to its best catalog match, that item's
//! genres become the tag query, and the anchor itself is removed from the
//! ranked result.

use crate::catalog::CatalogStore;
use crate::config::EngineConfig;
use crate::error::OsusumeError;
use crate::models::{ScoredTagMatch, ScoredTitleMatch};
use crate::resolver::{query_by_title, TitleQuery};
use crate::tags::{query_by_tags, TagQuery};

/// Extra rows fetched from the tag stage so dropping the anchor still fills `limit`.
const ANCHOR_OVERFETCH: usize = 5;

/// Recommend titles sharing genres with the best match for `anchor_title`.
///
/// The anchor is looked up across every season; `season` only restricts the
/// recommendations. An unresolvable anchor or one without genres yields an
/// empty list.
pub fn recommend_similar<S>(
    store: &S,
    config: &EngineConfig,
    anchor_title: &str,
    limit: usize,
    season: Option<&str>,
) -> Result<Vec<ScoredTagMatch>, OsusumeError>
where
    S: CatalogStore + ?Sized,
{
    let Some(anchor) = resolve_anchor(store, config, anchor_title)? else {
        tracing::debug!(anchor = %anchor_title, "No catalog match for anchor");
        return Ok(Vec::new());
    };

    if anchor.item.genres.is_empty() {
        tracing::debug!(anchor = %anchor.matched_title, "Anchor has no genres");
        return Ok(Vec::new());
    }

    let candidates = query_by_tags(
        store,
        &TagQuery {
            tags: &anchor.item.genres,
            limit: limit.saturating_add(ANCHOR_OVERFETCH),
            tag_bonus: config.tag_bonus,
            min_rating: config.min_rating,
            season,
        },
    )?;

    let anchor_id = anchor.item.id;
    let anchor_title_lower = anchor.item.title.to_lowercase();
    let recommendations: Vec<ScoredTagMatch> = candidates
        .into_iter()
        .filter(|m| m.item.id != anchor_id && m.item.title.to_lowercase() != anchor_title_lower)
        .take(limit)
        .collect();

    tracing::debug!(
        anchor = %anchor.matched_title,
        anchor_id,
        recommended = recommendations.len(),
        "Similar titles ranked"
    );

    Ok(recommendations)
}

fn resolve_anchor<S>(
    store: &S,
    config: &EngineConfig,
    anchor_title: &str,
) -> Result<Option<ScoredTitleMatch>, OsusumeError>
where
    S: CatalogStore + ?Sized,
{
    let query = TitleQuery::new(anchor_title)
        .threshold(config.similarity_threshold)
        .limit(1);
    Ok(query_by_title(store, &query)?.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::models::CatalogItem;

    fn config() -> EngineConfig {
        EngineConfig {
            min_rating: 0.0,
            ..EngineConfig::default()
        }
    }

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new(vec![
            CatalogItem::new(1, "DAN DA DAN")
                .with_rating(8.5)
                .with_season("2024-Fall")
                .with_genres(["Action", "Comedy", "Supernatural"]),
            CatalogItem::new(2, "Mob Psycho 100")
                .with_rating(8.4)
                .with_season("2016-Summer")
                .with_genres(["Action", "Comedy", "Supernatural"]),
            CatalogItem::new(3, "Chainsaw Man")
                .with_rating(8.5)
                .with_season("2022-Fall")
                .with_genres(["Action", "Supernatural"]),
            CatalogItem::new(4, "Kaguya-sama")
                .with_rating(8.9)
                .with_season("2019-Winter")
                .with_genres(["Comedy", "Romance"]),
            CatalogItem::new(5, "Mushishi")
                .with_rating(8.6)
                .with_genres(["Slice of Life"]),
            CatalogItem::new(6, "Dandadan")
                .with_rating(8.1)
                .with_season("2024-Fall")
                .with_genres(["Action"]),
        ])
    }

    #[test]
    fn excludes_anchor_and_ranks_by_overlap() {
        let results = recommend_similar(&catalog(), &config(), "DAN DA DAN", 5, None).unwrap();
        let ids: Vec<i64> = results.iter().map(|m| m.item.id).collect();

        assert!(!ids.contains(&1));
        assert_eq!(ids[0], 2);
        assert!(!ids.contains(&5));
        assert_eq!(ids, vec![2, 3, 4, 6]);
    }

    #[test]
    fn limit_applies_after_exclusion() {
        let results = recommend_similar(&catalog(), &config(), "DAN DA DAN", 2, None).unwrap();
        let ids: Vec<i64> = results.iter().map(|m| m.item.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn unbounded_limit_does_not_overflow() {
        let results =
            recommend_similar(&catalog(), &config(), "DAN DA DAN", usize::MAX, None).unwrap();
        let ids: Vec<i64> = results.iter().map(|m| m.item.id).collect();
        assert_eq!(ids, vec![2, 3, 4, 6]);
    }

    #[test]
    fn duplicate_anchor_title_is_excluded() {
        let mut catalog = catalog();
        catalog.push(
            CatalogItem::new(99, "dan da dan")
                .with_rating(9.9)
                .with_genres(["Action", "Comedy", "Supernatural"]),
        );
        let results = recommend_similar(&catalog, &config(), "DAN DA DAN", 10, None).unwrap();
        assert!(results.iter().all(|m| m.item.id != 1 && m.item.id != 99));
    }

    #[test]
    fn season_restricts_recommendations_only() {
        let results =
            recommend_similar(&catalog(), &config(), "DAN DA DAN", 5, Some("2022-fall")).unwrap();
        let ids: Vec<i64> = results.iter().map(|m| m.item.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn unknown_anchor_is_empty() {
        let results = recommend_similar(&catalog(), &config(), "迷宮飯", 5, None).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn anchor_without_genres_is_empty() {
        let results = recommend_similar(&catalog(), &config(), "Mushishi", 5, None).unwrap();
        assert!(results.is_empty());

        let bare = MemoryCatalog::new(vec![
            CatalogItem::new(1, "Bare").with_rating(8.0),
            CatalogItem::new(2, "Other").with_rating(8.0).with_genres(["Action"]),
        ]);
        assert!(recommend_similar(&bare, &config(), "Bare", 5, None).unwrap().is_empty());
    }
}
