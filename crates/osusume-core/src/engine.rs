use crate::catalog::CatalogStore;
use crate::config::{check_finite, check_threshold, EngineConfig};
use crate::error::OsusumeError;
use crate::models::{CatalogStats, ScoredTagMatch, ScoredTitleMatch};
use crate::recommend::recommend_similar;
use crate::resolver::{query_by_title, TitleQuery};
use crate::tags::{query_by_tags, TagQuery};

/// Title matching and recommendation over one catalog store.
///
/// Holds no state besides its store and an immutable [`EngineConfig`];
/// every call rescans the catalog. Build a new engine to change tunables.
pub struct Engine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: CatalogStore> Engine<S> {
    pub fn new(store: S, config: EngineConfig) -> Result<Self, OsusumeError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Catalog entries whose titles resemble `text`, best first.
    ///
    /// `None` parameters fall back to the engine's configuration; overrides
    /// are held to the same bounds as [`EngineConfig::validate`].
    #[tracing::instrument(skip_all, fields(query = %text, season = ?season))]
    pub fn query_by_title(
        &self,
        text: &str,
        threshold: Option<f64>,
        limit: Option<usize>,
        season: Option<&str>,
    ) -> Result<Vec<ScoredTitleMatch>, OsusumeError> {
        let threshold = threshold.unwrap_or(self.config.similarity_threshold);
        check_threshold(threshold)?;
        let query = TitleQuery::new(text)
            .threshold(threshold)
            .limit(limit.unwrap_or(self.config.title_limit))
            .season(season);
        query_by_title(&self.store, &query)
    }

    /// Catalog entries ranked by rating plus a bonus per shared tag.
    #[tracing::instrument(skip_all, fields(tags = ?tags, season = ?season))]
    pub fn query_by_tags(
        &self,
        tags: &[String],
        limit: Option<usize>,
        tag_bonus: Option<f64>,
        min_rating: Option<f64>,
        season: Option<&str>,
    ) -> Result<Vec<ScoredTagMatch>, OsusumeError> {
        let tag_bonus = tag_bonus.unwrap_or(self.config.tag_bonus);
        let min_rating = min_rating.unwrap_or(self.config.min_rating);
        check_finite("tag_bonus", tag_bonus)?;
        check_finite("min_rating", min_rating)?;

        let query = TagQuery {
            tags,
            limit: limit.unwrap_or(self.config.tag_limit),
            tag_bonus,
            min_rating,
            season,
        };
        query_by_tags(&self.store, &query)
    }

    /// Entries sharing genres with the best match for `anchor_title`, anchor excluded.
    #[tracing::instrument(skip_all, fields(anchor = %anchor_title, season = ?season))]
    pub fn recommend_similar(
        &self,
        anchor_title: &str,
        limit: Option<usize>,
        season: Option<&str>,
    ) -> Result<Vec<ScoredTagMatch>, OsusumeError> {
        recommend_similar(
            &self.store,
            &self.config,
            anchor_title,
            limit.unwrap_or(self.config.similar_limit),
            season,
        )
    }

    pub fn available_genres(&self) -> Result<Vec<String>, OsusumeError> {
        self.store.available_genres()
    }

    pub fn statistics(&self) -> Result<CatalogStats, OsusumeError> {
        self.store.statistics()
    }
}
