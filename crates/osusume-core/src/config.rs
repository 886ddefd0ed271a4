use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::OsusumeError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub engine: EngineConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Tunables for one recommendation engine instance.
///
/// Read-only once handed to an engine. To retune, build a new engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub tag_bonus: f64,
    pub min_rating: f64,
    pub similarity_threshold: f64,
    pub title_limit: usize,
    pub tag_limit: usize,
    pub similar_limit: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub db_path: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tag_bonus: 0.5,
            min_rating: 2.0,
            similarity_threshold: 0.6,
            title_limit: 10,
            tag_limit: 10,
            similar_limit: 10,
        }
    }
}

impl EngineConfig {
    /// Reject values that would make scores meaningless.
    pub fn validate(&self) -> Result<(), OsusumeError> {
        check_finite("tag_bonus", self.tag_bonus)?;
        check_finite("min_rating", self.min_rating)?;
        check_threshold(self.similarity_threshold)
    }
}

/// Shared by [`EngineConfig::validate`] and per-call overrides.
pub(crate) fn check_finite(name: &str, value: f64) -> Result<(), OsusumeError> {
    if !value.is_finite() {
        return Err(OsusumeError::Config(format!("{name} must be finite, got {value}")));
    }
    Ok(())
}

pub(crate) fn check_threshold(value: f64) -> Result<(), OsusumeError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(OsusumeError::Config(format!(
            "similarity_threshold must be within 0.0..=1.0, got {value}"
        )));
    }
    Ok(())
}

impl AppConfig {
    /// Load config: user file (if exists) or the built-in defaults.
    pub fn load() -> Result<Self, OsusumeError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            Self::load_from(&user_path)
        } else {
            Self::parse(DEFAULT_CONFIG)
        }
    }

    /// Load config from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, OsusumeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| OsusumeError::Config(e.to_string()))?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self, OsusumeError> {
        let config: AppConfig =
            toml::from_str(content).map_err(|e| OsusumeError::Config(e.to_string()))?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), OsusumeError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), OsusumeError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| OsusumeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Catalog database path: configured value, else the platform data dir.
    pub fn db_path(&self) -> PathBuf {
        match &self.catalog.db_path {
            Some(path) => PathBuf::from(path),
            None => Self::project_dirs()
                .map(|d| d.data_dir().join("anime.db"))
                .unwrap_or_else(|| PathBuf::from("anime.db")),
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "osusume")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
