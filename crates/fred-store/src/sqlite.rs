//! SQLite-backed store implementation.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use fred_core::{
    Category, CategoryId, FredError, Observation, Result, Series, SeriesId, SeriesStore,
};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, instrument};

/// SQLite-backed store for FRED data.
///
/// The store keeps its mirror of categories, series, and observations in a
/// SQLite database file, providing persistence across application restarts.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite store at the given path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation
    /// fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| FredError::Query(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite store.
    ///
    /// Useful for testing; data is lost when the store is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| FredError::Query(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FredError::Query(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                parent_id INTEGER
            )",
            [],
        )
        .map_err(|e| FredError::Write(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_categories_parent
             ON categories(parent_id)",
            [],
        )
        .map_err(|e| FredError::Write(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS series (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                frequency TEXT NOT NULL,
                category_id INTEGER,
                last_updated TEXT NOT NULL,
                observation_start TEXT,
                observation_end TEXT
            )",
            [],
        )
        .map_err(|e| FredError::Write(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_series_category
             ON series(category_id)",
            [],
        )
        .map_err(|e| FredError::Write(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS observations (
                series_id TEXT NOT NULL REFERENCES series(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                value REAL,
                PRIMARY KEY (series_id, date)
            )",
            [],
        )
        .map_err(|e| FredError::Write(e.to_string()))?;

        debug!("SQLite store schema initialized");
        Ok(())
    }
}

/// Raw series row as stored; converted to the domain type after the query.
type SeriesRow = (
    String,
    String,
    String,
    Option<i64>,
    String,
    Option<String>,
    Option<String>,
);

fn series_from_row(row: SeriesRow) -> Result<Series> {
    let (id, title, frequency, category_id, last_updated, start, end) = row;
    let last_updated = DateTime::parse_from_rfc3339(&last_updated)
        .map_err(|e| FredError::Parse(format!("Bad stored last_updated: {e}")))?;
    let mut series = Series::new(SeriesId::new(id), title, frequency.parse()?, last_updated);
    series.category_id = category_id.map(CategoryId);
    series.observation_start = parse_stored_date(start.as_deref())?;
    series.observation_end = parse_stored_date(end.as_deref())?;
    Ok(series)
}

fn parse_stored_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
    s.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| FredError::Parse(format!("Bad stored date {s:?}: {e}")))
    })
    .transpose()
}

#[async_trait]
impl SeriesStore for SqliteStore {
    #[instrument(skip(self))]
    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FredError::Query(e.to_string()))?;

        let row = conn
            .query_row(
                "SELECT id, name, parent_id FROM categories WHERE id = ?1",
                params![id.0],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| FredError::Query(e.to_string()))?;

        Ok(row.map(|(id, name, parent_id)| {
            Category::new(CategoryId(id), name, parent_id.map(CategoryId))
        }))
    }

    #[instrument(skip(self, categories), fields(count = categories.len()))]
    async fn put_categories(&self, categories: &[Category]) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FredError::Write(e.to_string()))?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| FredError::Write(e.to_string()))?;

        for category in categories {
            tx.execute(
                "INSERT OR REPLACE INTO categories (id, name, parent_id)
                 VALUES (?1, ?2, ?3)",
                params![
                    category.id.0,
                    category.name,
                    category.parent_id.map(|p| p.0)
                ],
            )
            .map_err(|e| FredError::Write(e.to_string()))?;
        }

        tx.commit().map_err(|e| FredError::Write(e.to_string()))?;
        debug!("Stored {} categories", categories.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn categories_by_parent(&self, parent: CategoryId) -> Result<Vec<Category>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FredError::Query(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT id, name, parent_id FROM categories
                 WHERE parent_id = ?1 ORDER BY id ASC",
            )
            .map_err(|e| FredError::Query(e.to_string()))?;

        let rows = stmt
            .query_map(params![parent.0], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                ))
            })
            .map_err(|e| FredError::Query(e.to_string()))?;

        let mut categories = Vec::new();
        for row in rows {
            let (id, name, parent_id) = row.map_err(|e| FredError::Query(e.to_string()))?;
            categories.push(Category::new(
                CategoryId(id),
                name,
                parent_id.map(CategoryId),
            ));
        }
        Ok(categories)
    }

    #[instrument(skip(self))]
    async fn get_series(&self, id: &SeriesId) -> Result<Option<Series>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FredError::Query(e.to_string()))?;

        let row = conn
            .query_row(
                "SELECT id, title, frequency, category_id, last_updated,
                        observation_start, observation_end
                 FROM series WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<i64>>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, Option<String>>(6)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| FredError::Query(e.to_string()))?;

        row.map(series_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn series_in_category(&self, category: CategoryId) -> Result<Vec<Series>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FredError::Query(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT id, title, frequency, category_id, last_updated,
                        observation_start, observation_end
                 FROM series WHERE category_id = ?1 ORDER BY id ASC",
            )
            .map_err(|e| FredError::Query(e.to_string()))?;

        let rows = stmt
            .query_map(params![category.0], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, Option<String>>(6)?,
                ))
            })
            .map_err(|e| FredError::Query(e.to_string()))?;

        let mut series = Vec::new();
        for row in rows {
            series.push(series_from_row(
                row.map_err(|e| FredError::Query(e.to_string()))?,
            )?);
        }
        Ok(series)
    }

    #[instrument(skip(self, series), fields(series = %series.id))]
    async fn put_series(&self, series: &Series) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FredError::Write(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO series
             (id, title, frequency, category_id, last_updated,
              observation_start, observation_end)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                series.id.as_str(),
                series.title,
                series.frequency.as_str(),
                series.category_id.map(|c| c.0),
                series.last_updated.to_rfc3339(),
                series.observation_start.map(|d| d.to_string()),
                series.observation_end.map(|d| d.to_string()),
            ],
        )
        .map_err(|e| FredError::Write(e.to_string()))?;

        debug!("Stored series");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_series(&self, id: &SeriesId) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FredError::Write(e.to_string()))?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| FredError::Write(e.to_string()))?;

        tx.execute(
            "DELETE FROM observations WHERE series_id = ?1",
            params![id.as_str()],
        )
        .map_err(|e| FredError::Write(e.to_string()))?;
        let deleted = tx
            .execute("DELETE FROM series WHERE id = ?1", params![id.as_str()])
            .map_err(|e| FredError::Write(e.to_string()))?;

        tx.commit().map_err(|e| FredError::Write(e.to_string()))?;
        debug!("Deleted {} series rows", deleted);
        Ok(())
    }

    #[instrument(skip(self, series, observations), fields(series = %series.id, count = observations.len()))]
    async fn replace_series(&self, series: &Series, observations: &[Observation]) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FredError::Write(e.to_string()))?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| FredError::Write(e.to_string()))?;

        tx.execute(
            "DELETE FROM observations WHERE series_id = ?1",
            params![series.id.as_str()],
        )
        .map_err(|e| FredError::Write(e.to_string()))?;

        tx.execute(
            "INSERT OR REPLACE INTO series
             (id, title, frequency, category_id, last_updated,
              observation_start, observation_end)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                series.id.as_str(),
                series.title,
                series.frequency.as_str(),
                series.category_id.map(|c| c.0),
                series.last_updated.to_rfc3339(),
                series.observation_start.map(|d| d.to_string()),
                series.observation_end.map(|d| d.to_string()),
            ],
        )
        .map_err(|e| FredError::Write(e.to_string()))?;

        for obs in observations {
            tx.execute(
                "INSERT OR REPLACE INTO observations (series_id, date, value)
                 VALUES (?1, ?2, ?3)",
                params![obs.series_id.as_str(), obs.date.to_string(), obs.value],
            )
            .map_err(|e| FredError::Write(e.to_string()))?;
        }

        tx.commit().map_err(|e| FredError::Write(e.to_string()))?;
        debug!("Replaced series with {} observations", observations.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_observations(&self, id: &SeriesId) -> Result<Vec<Observation>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FredError::Query(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT series_id, date, value FROM observations
                 WHERE series_id = ?1 ORDER BY date ASC",
            )
            .map_err(|e| FredError::Query(e.to_string()))?;

        let rows = stmt
            .query_map(params![id.as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                ))
            })
            .map_err(|e| FredError::Query(e.to_string()))?;

        let mut observations = Vec::new();
        for row in rows {
            let (series_id, date, value) = row.map_err(|e| FredError::Query(e.to_string()))?;
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| FredError::Parse(format!("Bad stored date {date:?}: {e}")))?;
            observations.push(Observation::new(SeriesId::new(series_id), date, value));
        }

        debug!("Found {} stored observations", observations.len());
        Ok(observations)
    }

    #[instrument(skip(self, observations), fields(count = observations.len()))]
    async fn put_observations(&self, observations: &[Observation]) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FredError::Write(e.to_string()))?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| FredError::Write(e.to_string()))?;

        // All-or-nothing: the transaction rolls back on the first bad row.
        for obs in observations {
            tx.execute(
                "INSERT OR REPLACE INTO observations (series_id, date, value)
                 VALUES (?1, ?2, ?3)",
                params![obs.series_id.as_str(), obs.date.to_string(), obs.value],
            )
            .map_err(|e| FredError::Write(e.to_string()))?;
        }

        tx.commit().map_err(|e| FredError::Write(e.to_string()))?;
        debug!("Stored {} observations", observations.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn is_empty_series(&self, id: &SeriesId) -> Result<bool> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FredError::Query(e.to_string()))?;

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM observations WHERE series_id = ?1",
                params![id.as_str()],
                |row| row.get(0),
            )
            .map_err(|e| FredError::Query(e.to_string()))?;

        Ok(count == 0)
    }

    #[instrument(skip(self, series), fields(series = %series.id))]
    async fn is_new_series(&self, series: &Series) -> Result<bool> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FredError::Query(e.to_string()))?;

        let stored: Option<String> = conn
            .query_row(
                "SELECT last_updated FROM series WHERE id = ?1",
                params![series.id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| FredError::Query(e.to_string()))?;

        match stored {
            None => Ok(true),
            Some(stored) => {
                let stored = DateTime::parse_from_rfc3339(&stored)
                    .map_err(|e| FredError::Parse(format!("Bad stored last_updated: {e}")))?;
                Ok(series.last_updated > stored)
            }
        }
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FredError::Write(e.to_string()))?;

        conn.execute("DELETE FROM observations", [])
            .map_err(|e| FredError::Write(e.to_string()))?;
        conn.execute("DELETE FROM series", [])
            .map_err(|e| FredError::Write(e.to_string()))?;
        conn.execute("DELETE FROM categories", [])
            .map_err(|e| FredError::Write(e.to_string()))?;

        debug!("Cleared all stored data");
        Ok(())
    }
}
