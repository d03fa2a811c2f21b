//! Local dub-cast store.
//!
//! SQLite database holding supplemental dubbed-cast records keyed by show
//! and season. The organize flow only reads from it; the `dubdb` binary
//! owns the writes.

use crate::models::metadata::{person_thumb, Actor};
use crate::Result;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;

/// Read-side port the reconciler depends on.
#[async_trait]
pub trait DubStore {
    /// Look up the local season id for a show/season pair.
    async fn find_season_id(&self, show_id: i64, season_number: u32) -> Result<Option<i64>>;

    /// List the dub actors recorded for a season.
    async fn list_actors_for_season(&self, season_id: i64) -> Result<Vec<Actor>>;
}

/// A season row, as listed by `dubdb season list`.
#[derive(Debug, Clone)]
pub struct SeasonRow {
    pub id: i64,
    pub title: String,
    pub season_number: u32,
}

/// A person row.
#[derive(Debug, Clone)]
pub struct PersonRow {
    pub id: i64,
    pub name: String,
}

/// SQLite-backed store.
pub struct SqliteDubStore {
    pool: SqlitePool,
}

impl SqliteDubStore {
    /// Open an existing database file.
    pub async fn open(path: &Path) -> Result<Self> {
        Self::connect(path, false).await
    }

    /// Open a database file, creating it and its schema if missing.
    pub async fn create(path: &Path) -> Result<Self> {
        let store = Self::connect(path, true).await?;
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn connect(path: &Path, create: bool) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(create);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tv_shows (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tmdb_id INTEGER NOT NULL UNIQUE,
                title TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS seasons (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tv_show_id INTEGER NOT NULL REFERENCES tv_shows(id),
                title TEXT NOT NULL,
                season_number INTEGER NOT NULL,
                UNIQUE(tv_show_id, season_number)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS people (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                full_name TEXT,
                birthday TEXT,
                birthday_year INTEGER,
                birth_place TEXT,
                famous_roles TEXT,
                biography TEXT,
                photo_src_url TEXT
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS roles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL,
                character TEXT,
                people_id INTEGER NOT NULL REFERENCES people(id),
                tv_show_id INTEGER NOT NULL REFERENCES tv_shows(id),
                season_id INTEGER NOT NULL REFERENCES seasons(id),
                UNIQUE(people_id, season_id, character)
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert or fetch a show row by its TMDB id. Returns the internal id.
    pub async fn create_show(&self, tmdb_id: i64, title: &str) -> Result<i64> {
        sqlx::query("INSERT INTO tv_shows (tmdb_id, title) VALUES (?, ?) ON CONFLICT(tmdb_id) DO NOTHING")
            .bind(tmdb_id)
            .bind(title)
            .execute(&self.pool)
            .await?;

        let row = sqlx::query("SELECT id FROM tv_shows WHERE tmdb_id = ?")
            .bind(tmdb_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("id")?)
    }

    /// Insert a season row. Fails on a duplicate (show, season) pair.
    pub async fn create_season(
        &self,
        show_row_id: i64,
        title: &str,
        season_number: u32,
    ) -> Result<i64> {
        let result =
            sqlx::query("INSERT INTO seasons (tv_show_id, title, season_number) VALUES (?, ?, ?)")
                .bind(show_row_id)
                .bind(title)
                .bind(season_number)
                .execute(&self.pool)
                .await?;

        Ok(result.last_insert_rowid())
    }

    /// Find an existing season row id for a show.
    pub async fn get_season_id(&self, show_row_id: i64, season_number: u32) -> Result<Option<i64>> {
        let row = sqlx::query("SELECT id FROM seasons WHERE tv_show_id = ? AND season_number = ?")
            .bind(show_row_id)
            .bind(season_number)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_get("id")).transpose().map_err(Into::into)
    }

    /// List the seasons stored for a show (by TMDB id).
    pub async fn list_seasons(&self, tmdb_id: i64) -> Result<Vec<SeasonRow>> {
        let rows = sqlx::query(
            "SELECT seasons.id, seasons.title, seasons.season_number
             FROM seasons
             JOIN tv_shows ON tv_shows.id = seasons.tv_show_id
             WHERE tv_shows.tmdb_id = ?
             ORDER BY seasons.season_number",
        )
        .bind(tmdb_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(SeasonRow {
                    id: row.try_get("id")?,
                    title: row.try_get("title")?,
                    season_number: row.try_get::<i64, _>("season_number")? as u32,
                })
            })
            .collect()
    }

    /// Title of a show by TMDB id.
    pub async fn show_title(&self, tmdb_id: i64) -> Result<Option<String>> {
        let row = sqlx::query("SELECT title FROM tv_shows WHERE tmdb_id = ?")
            .bind(tmdb_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_get("title")).transpose().map_err(Into::into)
    }

    /// Insert a person row. Fails if the name already exists.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_person(
        &self,
        name: &str,
        full_name: Option<&str>,
        birthday: Option<&str>,
        birthday_year: Option<i32>,
        birth_place: Option<&str>,
        famous_roles: Option<&str>,
        biography: Option<&str>,
        photo_src_url: Option<&str>,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO people
             (name, full_name, birthday, birthday_year, birth_place, famous_roles, biography, photo_src_url)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(full_name)
        .bind(birthday)
        .bind(birthday_year)
        .bind(birth_place)
        .bind(famous_roles)
        .bind(biography)
        .bind(photo_src_url)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Find a person row by exact name.
    pub async fn get_person_by_name(&self, name: &str) -> Result<Option<PersonRow>> {
        let row = sqlx::query("SELECT id, name FROM people WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| {
            Ok(PersonRow {
                id: r.try_get("id")?,
                name: r.try_get("name")?,
            })
        })
        .transpose()
    }

    /// Record a role linking a person to a show season.
    pub async fn create_role(
        &self,
        kind: &str,
        character: &str,
        people_id: i64,
        show_row_id: i64,
        season_id: i64,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO roles (type, character, people_id, tv_show_id, season_id)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(kind)
        .bind(character)
        .bind(people_id)
        .bind(show_row_id)
        .bind(season_id)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}

#[async_trait]
impl DubStore for SqliteDubStore {
    async fn find_season_id(&self, show_id: i64, season_number: u32) -> Result<Option<i64>> {
        let row = sqlx::query(
            "SELECT seasons.id
             FROM seasons
             JOIN tv_shows ON tv_shows.id = seasons.tv_show_id
             WHERE tv_shows.tmdb_id = ? AND seasons.season_number = ?",
        )
        .bind(show_id)
        .bind(season_number)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_get("id")).transpose().map_err(Into::into)
    }

    async fn list_actors_for_season(&self, season_id: i64) -> Result<Vec<Actor>> {
        let rows = sqlx::query(
            "SELECT people.name, people.full_name, people.photo_src_url, roles.character
             FROM roles
             JOIN people ON people.id = roles.people_id
             WHERE roles.season_id = ? AND roles.type = 'actor'
             ORDER BY roles.id",
        )
        .bind(season_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let name: String = row.try_get("name")?;
                Ok(Actor {
                    thumb: person_thumb(&name),
                    original_name: row.try_get("full_name")?,
                    kind: "Actor".to_string(),
                    role: row
                        .try_get::<Option<String>, _>("character")?
                        .unwrap_or_else(|| "Unknown".to_string()),
                    photo: row.try_get("photo_src_url")?,
                    name,
                })
            })
            .collect()
    }
}
