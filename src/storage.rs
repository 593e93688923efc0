//! SQLite storage layer for enclosures and readings.
//!
//! The schema mirrors what the evaluation core consumes: enclosures with an
//! optional species assignment, and readings where each of the three metrics
//! is independently nullable. A NULL metric is preserved as NULL end to end;
//! it is never coerced to zero. Reading history queries are bounded below by
//! a timestamp and returned ascending, which is the contract the charting
//! layer relies on.

use chrono::{DateTime, TimeZone, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};

use crate::model::{Enclosure, NewEnclosure, NewReading, Reading};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Create a new storage instance and initialize the schema.
    ///
    /// # Arguments
    ///
    /// * `database_url` - SQLite connection string (e.g., "sqlite:vivarium.db"
    ///   or "sqlite::memory:")
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let storage = Self { pool };
        storage.initialize_schema().await?;

        Ok(storage)
    }

    /// Create the database schema if it doesn't exist.
    async fn initialize_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS enclosures (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                species TEXT,
                description TEXT,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS readings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                enclosure_id INTEGER NOT NULL,
                ts INTEGER NOT NULL,
                humidity REAL,
                air_temperature REAL,
                surface_temperature REAL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Index for efficient time-range queries per enclosure
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_readings_enclosure_ts
            ON readings(enclosure_id, ts)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Register a new enclosure and return it with its assigned id.
    pub async fn create_enclosure(&self, new: &NewEnclosure) -> anyhow::Result<Enclosure> {
        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO enclosures (name, species, description, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&new.name)
        .bind(&new.species)
        .bind(&new.description)
        .bind(created_at.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(Enclosure {
            id: result.last_insert_rowid(),
            name: new.name.clone(),
            species: new.species.clone(),
            description: new.description.clone(),
            created_at: from_unix(created_at.timestamp()),
        })
    }

    /// List all registered enclosures, oldest first.
    pub async fn list_enclosures(&self) -> anyhow::Result<Vec<Enclosure>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, species, description, created_at
            FROM enclosures
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(enclosure_from_row).collect())
    }

    /// Fetch one enclosure by id. Absence is not an error.
    pub async fn get_enclosure(&self, id: i64) -> anyhow::Result<Option<Enclosure>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, species, description, created_at
            FROM enclosures
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(enclosure_from_row))
    }

    /// Insert a sensor reading. Absent metrics are stored as NULL.
    pub async fn insert_reading(&self, reading: &NewReading) -> anyhow::Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO readings (enclosure_id, ts, humidity, air_temperature, surface_temperature)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(reading.enclosure_id)
        .bind(reading.timestamp.timestamp())
        .bind(reading.humidity)
        .bind(reading.air_temperature)
        .bind(reading.surface_temperature)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Fetch the reading history for an enclosure since a lower bound,
    /// ascending by timestamp.
    ///
    /// This is the reading-store contract the window planner and charting
    /// layer are written against: `ts >= since`, no partial results.
    pub async fn fetch_readings(
        &self,
        enclosure_id: i64,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Reading>> {
        let rows = sqlx::query(
            r#"
            SELECT id, enclosure_id, ts, humidity, air_temperature, surface_temperature
            FROM readings
            WHERE enclosure_id = ? AND ts >= ?
            ORDER BY ts ASC, id ASC
            "#,
        )
        .bind(enclosure_id)
        .bind(since.timestamp())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(reading_from_row).collect())
    }

    /// The most recent reading for an enclosure, if any exists.
    pub async fn latest_reading(&self, enclosure_id: i64) -> anyhow::Result<Option<Reading>> {
        let row = sqlx::query(
            r#"
            SELECT id, enclosure_id, ts, humidity, air_temperature, surface_temperature
            FROM readings
            WHERE enclosure_id = ?
            ORDER BY ts DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(enclosure_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(reading_from_row))
    }
}

fn enclosure_from_row(row: &SqliteRow) -> Enclosure {
    Enclosure {
        id: row.get("id"),
        name: row.get("name"),
        species: row.get("species"),
        description: row.get("description"),
        created_at: from_unix(row.get("created_at")),
    }
}

fn reading_from_row(row: &SqliteRow) -> Reading {
    Reading {
        id: row.get("id"),
        enclosure_id: row.get("enclosure_id"),
        timestamp: from_unix(row.get("ts")),
        humidity: row.get("humidity"),
        air_temperature: row.get("air_temperature"),
        surface_temperature: row.get("surface_temperature"),
    }
}

fn from_unix(ts: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(ts, 0).unwrap()
}
