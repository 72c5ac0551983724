//! SQLite-backed forecast store.
//!
//! Table `forecasts` keyed by Unix seconds. `local_time` keeps the RFC 3339
//! rendering with the offset the record was windowed in.

use chrono::DateTime;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;

use crate::backend::{ForecastStore, StoreError, StoreResult, UpsertOutcome};
use crate::record::StoredRecord;

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, _)
                if matches!(
                    err.code,
                    ErrorCode::DatabaseBusy
                        | ErrorCode::DatabaseLocked
                        | ErrorCode::CannotOpen
                        | ErrorCode::NotADatabase
                ) =>
            {
                StoreError::Unavailable(e.to_string())
            }
            _ => StoreError::Rejected(e.to_string()),
        }
    }
}

/// Columns as read from a row, before the timestamp is parsed.
struct RawRow {
    local_time: String,
    datetime_str: String,
    temperature: f64,
    humidity: u8,
    wind_speed: f64,
    wind_degree: u16,
}

impl RawRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            local_time: row.get(0)?,
            datetime_str: row.get(1)?,
            temperature: row.get(2)?,
            humidity: row.get(3)?,
            wind_speed: row.get(4)?,
            wind_degree: row.get(5)?,
        })
    }

    fn into_record(self) -> StoreResult<StoredRecord> {
        let timestamp = DateTime::parse_from_rfc3339(&self.local_time)
            .map_err(|e| StoreError::Corrupt(format!("local_time {:?}: {}", self.local_time, e)))?;

        Ok(StoredRecord {
            timestamp,
            datetime_str: self.datetime_str,
            temperature: self.temperature,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            wind_degree: self.wind_degree,
        })
    }
}

/// SQLite-based forecast storage.
pub struct SqliteForecastStore {
    conn: Connection,
}

impl SqliteForecastStore {
    /// Open (or create) the store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::unavailable(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| StoreError::unavailable(format!("{}: {}", path.display(), e)))?;
        let store = Self { conn };
        store.init_schema()?;

        tracing::debug!("Opened forecast store at {}", path.display());
        Ok(store)
    }

    /// A throwaway store that lives as long as the value.
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS forecasts (
                timestamp INTEGER PRIMARY KEY,
                local_time TEXT NOT NULL,
                datetime_str TEXT NOT NULL,
                temperature REAL NOT NULL,
                humidity INTEGER NOT NULL,
                wind_speed REAL NOT NULL,
                wind_degree INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl ForecastStore for SqliteForecastStore {
    fn upsert(&self, record: &StoredRecord) -> StoreResult<UpsertOutcome> {
        let key = record.key();
        let tx = self.conn.unchecked_transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM forecasts WHERE timestamp = ?1)",
            params![key],
            |row| row.get(0),
        )?;

        tx.execute(
            r#"
            INSERT INTO forecasts (timestamp, local_time, datetime_str, temperature, humidity, wind_speed, wind_degree)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(timestamp) DO UPDATE SET
                local_time = excluded.local_time,
                datetime_str = excluded.datetime_str,
                temperature = excluded.temperature,
                humidity = excluded.humidity,
                wind_speed = excluded.wind_speed,
                wind_degree = excluded.wind_degree
            "#,
            params![
                key,
                record.timestamp.to_rfc3339(),
                record.datetime_str,
                record.temperature,
                record.humidity,
                record.wind_speed,
                record.wind_degree,
            ],
        )?;
        tx.commit()?;

        let outcome = if exists {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Inserted
        };
        tracing::trace!("Upserted forecast {} ({:?})", record.timestamp, outcome);
        Ok(outcome)
    }

    fn get(&self, timestamp: i64) -> StoreResult<Option<StoredRecord>> {
        let raw = self
            .conn
            .query_row(
                "SELECT local_time, datetime_str, temperature, humidity, wind_speed, wind_degree
                 FROM forecasts WHERE timestamp = ?1",
                params![timestamp],
                RawRow::from_row,
            )
            .optional()?;

        raw.map(RawRow::into_record).transpose()
    }

    fn list(&self) -> StoreResult<Vec<StoredRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT local_time, datetime_str, temperature, humidity, wind_speed, wind_degree
             FROM forecasts
             ORDER BY timestamp ASC",
        )?;

        let rows = stmt
            .query_map([], RawRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawRow::into_record).collect()
    }

    fn count(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM forecasts", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
