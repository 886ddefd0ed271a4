//! `osusume` command-line front end.
//!
//! Every query subcommand prints its result as pretty JSON on stdout; logs go
//! to stderr and are filtered through `RUST_LOG` (default `osusume=info`).

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use osusume_core::models::CatalogItem;
use osusume_core::{AppConfig, Engine, Storage};

#[derive(Parser)]
#[command(name = "osusume")]
#[command(about = "Anime title matching and tag-based recommendations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Catalog database (default: configured path or the platform data dir)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Config file (default: user config dir, else built-in defaults)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Find catalog titles resembling QUERY
    Title {
        query: String,

        /// Minimum similarity, 0.0 to 1.0
        #[arg(long)]
        threshold: Option<f64>,

        #[arg(long)]
        limit: Option<usize>,

        /// Restrict to one season, e.g. 2024-fall
        #[arg(long)]
        season: Option<String>,
    },

    /// Rank titles by rating plus shared tags
    Tags {
        #[arg(required = true)]
        tags: Vec<String>,

        #[arg(long)]
        limit: Option<usize>,

        /// Score added per matched tag
        #[arg(long)]
        tag_bonus: Option<f64>,

        #[arg(long)]
        min_rating: Option<f64>,

        #[arg(long)]
        season: Option<String>,
    },

    /// Recommend titles similar to TITLE
    Similar {
        title: String,

        #[arg(long)]
        limit: Option<usize>,

        /// Season the recommendations must air in
        #[arg(long)]
        season: Option<String>,
    },

    /// List every genre in the catalog
    Genres,

    /// Show catalog statistics
    Stats,

    /// Load catalog entries from a JSON array, creating the database if needed
    Import { file: PathBuf },
}

#[derive(Serialize)]
struct ImportSummary {
    imported: usize,
    db: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("osusume=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("failed to load config")?,
    };
    let db = cli.db.unwrap_or_else(|| config.db_path());

    match cli.command {
        Commands::Import { file } => print_json(&import(&db, &file)?),
        Commands::Title {
            query,
            threshold,
            limit,
            season,
        } => {
            let engine = open_engine(&db, &config)?;
            print_json(&engine.query_by_title(&query, threshold, limit, season.as_deref())?)
        }
        Commands::Tags {
            tags,
            limit,
            tag_bonus,
            min_rating,
            season,
        } => {
            let engine = open_engine(&db, &config)?;
            print_json(&engine.query_by_tags(
                &tags,
                limit,
                tag_bonus,
                min_rating,
                season.as_deref(),
            )?)
        }
        Commands::Similar {
            title,
            limit,
            season,
        } => {
            let engine = open_engine(&db, &config)?;
            print_json(&engine.recommend_similar(&title, limit, season.as_deref())?)
        }
        Commands::Genres => print_json(&open_engine(&db, &config)?.available_genres()?),
        Commands::Stats => print_json(&open_engine(&db, &config)?.statistics()?),
    }
}

fn open_engine(db: &Path, config: &AppConfig) -> anyhow::Result<Engine<Storage>> {
    let storage = Storage::open(db)
        .with_context(|| format!("failed to open catalog at {}", db.display()))?;
    Ok(Engine::new(storage, config.engine.clone())?)
}

fn import(db: &Path, file: &Path) -> anyhow::Result<ImportSummary> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let items: Vec<CatalogItem> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of catalog entries", file.display()))?;

    let storage = Storage::create(db)
        .with_context(|| format!("failed to create catalog at {}", db.display()))?;
    for item in &items {
        storage.insert_item(item)?;
    }
    tracing::info!(count = items.len(), db = %db.display(), "Imported catalog entries");

    Ok(ImportSummary {
        imported: items.len(),
        db: db.to_path_buf(),
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_tags_with_overrides() {
        let cli = Cli::try_parse_from([
            "osusume",
            "tags",
            "Action",
            "Comedy",
            "--tag-bonus",
            "1.5",
            "--min-rating",
            "0",
            "--db",
            "catalog.db",
        ])
        .unwrap();

        assert_eq!(cli.db, Some(PathBuf::from("catalog.db")));
        match cli.command {
            Commands::Tags {
                tags,
                tag_bonus,
                min_rating,
                limit,
                season,
            } => {
                assert_eq!(tags, vec!["Action", "Comedy"]);
                assert_eq!(tag_bonus, Some(1.5));
                assert_eq!(min_rating, Some(0.0));
                assert_eq!(limit, None);
                assert_eq!(season, None);
            }
            _ => panic!("expected tags subcommand"),
        }
    }

    #[test]
    fn tags_requires_at_least_one_tag() {
        assert!(Cli::try_parse_from(["osusume", "tags"]).is_err());
    }

    #[test]
    fn parses_title_with_season() {
        let cli = Cli::try_parse_from([
            "osusume",
            "title",
            "Show A 第2季",
            "--threshold",
            "0.5",
            "--season",
            "2024-fall",
        ])
        .unwrap();
        match cli.command {
            Commands::Title {
                query,
                threshold,
                season,
                ..
            } => {
                assert_eq!(query, "Show A 第2季");
                assert_eq!(threshold, Some(0.5));
                assert_eq!(season.as_deref(), Some("2024-fall"));
            }
            _ => panic!("expected title subcommand"),
        }
    }

    #[test]
    fn import_then_query() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("data").join("anime.db");
        let file = dir.path().join("items.json");
        std::fs::write(
            &file,
            r#"[
                {"title": "Show A", "rating": 8.0, "genres": ["Action", "Adventure"]},
                {"title": "Show B", "rating": 9.0, "genres": ["Comedy"], "season": "2024-Fall"}
            ]"#,
        )
        .unwrap();

        let summary = import(&db, &file).unwrap();
        assert_eq!(summary.imported, 2);

        let engine = Engine::new(Storage::open(&db).unwrap(), Default::default()).unwrap();
        let genres = engine.available_genres().unwrap();
        assert_eq!(genres, vec!["Action", "Adventure", "Comedy"]);
    }
}
