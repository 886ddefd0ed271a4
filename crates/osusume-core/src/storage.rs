use std::collections::HashSet;
use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use crate::catalog::{CatalogStore, TOP_RATED_COUNT};
use crate::error::OsusumeError;
use crate::models::{CatalogFilter, CatalogItem, CatalogStats};

const SCHEMA_V1: &str = include_str!("../../../migrations/001_initial.sql");

/// Columns older catalog files may lack, with the type used to add them.
const BACKFILL_COLUMNS: &[(&str, &str)] = &[
    ("platforms_json", "TEXT"),
    ("synopsis", "TEXT"),
    ("image_path", "TEXT"),
    ("is_liked", "INTEGER NOT NULL DEFAULT 0"),
    ("is_disliked", "INTEGER NOT NULL DEFAULT 0"),
];

const SELECT_ITEM: &str = "SELECT id, title, season, episodes, rating, viewers_count,
     genres_json, platforms_json, synopsis, image_path, is_liked, is_disliked
     FROM anime";

/// SQLite-backed anime catalog.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open an existing catalog file and run pending migrations.
    ///
    /// A missing file is [`OsusumeError::StoreUnavailable`]; use [`Storage::create`]
    /// to start a new catalog.
    pub fn open(path: &Path) -> Result<Self, OsusumeError> {
        if !path.is_file() {
            return Err(OsusumeError::StoreUnavailable(path.to_path_buf()));
        }
        Self::open_at(path)
    }

    /// Open the catalog at `path`, creating it (and its directory) if needed.
    pub fn create(path: &Path) -> Result<Self, OsusumeError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::open_at(path)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, OsusumeError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    fn open_at(path: &Path) -> Result<Self, OsusumeError> {
        let conn = Connection::open(path)?;
        // WAL lets several engines read while an importer writes.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Insert a catalog row, returning its auto-generated ID.
    ///
    /// `item.id` is ignored.
    pub fn insert_item(&self, item: &CatalogItem) -> Result<i64, OsusumeError> {
        let genres_json = serde_json::to_string(&item.genres).unwrap_or_default();
        let platforms_json = serde_json::to_string(&item.platforms).unwrap_or_default();
        self.conn.execute(
            "INSERT INTO anime (title, season, episodes, rating, viewers_count,
             genres_json, platforms_json, synopsis, image_path, is_liked, is_disliked)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                item.title,
                item.season,
                item.episodes,
                item.rating,
                item.viewers_count,
                genres_json,
                platforms_json,
                item.synopsis,
                item.image_path,
                item.liked as i32,
                item.disliked as i32,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Write a raw `genres_json` value, bypassing encoding (for repair tools and tests).
    pub fn set_genres_json(&self, id: i64, raw: Option<&str>) -> Result<(), OsusumeError> {
        self.conn.execute(
            "UPDATE anime SET genres_json = ?1 WHERE id = ?2",
            params![raw, id],
        )?;
        Ok(())
    }
}

impl CatalogStore for Storage {
    fn fetch_all(&self, filter: &CatalogFilter) -> Result<Vec<CatalogItem>, OsusumeError> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(min) = filter.min_rating {
            clauses.push("rating >= ?");
            values.push(Value::Real(min));
        }
        if let Some(season) = &filter.season {
            clauses.push("season = ?");
            values.push(Value::Text(season.clone()));
        }

        let mut sql = String::from(SELECT_ITEM);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn available_genres(&self) -> Result<Vec<String>, OsusumeError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, genres_json FROM anime WHERE genres_json IS NOT NULL")?;
        let mut genres: Vec<String> = stmt
            .query_map([], |row| {
                let id: i64 = row.get(0)?;
                let raw: String = row.get(1)?;
                Ok(decode_list(id, "genres_json", Some(&raw)))
            })?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect();
        genres.sort();
        genres.dedup();
        Ok(genres)
    }

    fn statistics(&self) -> Result<CatalogStats, OsusumeError> {
        let total_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM anime", [], |row| row.get(0))?;

        let (avg, min, max): (Option<f64>, Option<f64>, Option<f64>) = self.conn.query_row(
            "SELECT AVG(rating), MIN(rating), MAX(rating) FROM anime WHERE rating IS NOT NULL",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT title, rating FROM anime WHERE rating IS NOT NULL
             ORDER BY rating DESC, id LIMIT ?1",
        )?;
        let top_rated = stmt
            .query_map(params![TOP_RATED_COUNT as i64], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<Result<Vec<(String, f64)>, _>>()?;

        Ok(CatalogStats {
            total_count: total_count as usize,
            avg_rating: avg.unwrap_or(0.0),
            min_rating: min.unwrap_or(0.0),
            max_rating: max.unwrap_or(0.0),
            top_rated,
            available_genres: self.available_genres()?,
        })
    }
}

fn run_migrations(conn: &Connection) -> Result<(), OsusumeError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        backfill_columns(conn)?;
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
    }
    Ok(())
}

/// Add any [`BACKFILL_COLUMNS`] missing from an existing `anime` table.
///
/// A fresh database has no table yet and is left to `SCHEMA_V1`.
fn backfill_columns(conn: &Connection) -> Result<(), OsusumeError> {
    let existing: HashSet<String> = conn
        .prepare("PRAGMA table_info(anime)")?
        .query_map([], |row| row.get(1))?
        .collect::<Result<_, _>>()?;
    if existing.is_empty() {
        return Ok(());
    }

    for &(column, ty) in BACKFILL_COLUMNS {
        if !existing.contains(column) {
            conn.execute_batch(&format!("ALTER TABLE anime ADD COLUMN {column} {ty}"))?;
            tracing::info!(column, "Added missing catalog column");
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<CatalogItem> {
    let id: i64 = row.get(0)?;
    let genres_raw: Option<String> = row.get(6)?;
    let platforms_raw: Option<String> = row.get(7)?;

    Ok(CatalogItem {
        id,
        title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        season: row.get(2)?,
        episodes: row.get(3).unwrap_or(None),
        rating: row.get(4)?,
        viewers_count: row.get(5).unwrap_or(None),
        genres: decode_list(id, "genres_json", genres_raw.as_deref()),
        platforms: decode_list(id, "platforms_json", platforms_raw.as_deref()),
        synopsis: row.get(8)?,
        image_path: row.get(9)?,
        liked: row.get::<_, Option<i32>>(10)?.unwrap_or(0) != 0,
        disliked: row.get::<_, Option<i32>>(11)?.unwrap_or(0) != 0,
    })
}

/// Decode a JSON string-array column. Malformed text becomes an empty list.
fn decode_list(id: i64, column: &str, raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!(id, column, error = %e, "Malformed list column, treating as empty");
            Vec::new()
        }
    }
}
