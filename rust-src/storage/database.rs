//! SQLite backend for monthly records.
//!
//! Same overwrite-in-place semantics as the JSON file: one row per month,
//! replaced wholesale on every save. Saving over a file that is not a
//! database writes a fresh one beside it and renames it into place.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, ErrorCode};
use tracing::warn;

use crate::models::{MonthKey, MonthlyCounts, RecordMap, ValidationError};

use super::{temp_path, RecordBackend, StoreError};


pub struct SqliteBackend {
    path: PathBuf,
}


impl SqliteBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path).map_err(|e| self.classify(e))?;
        init_schema(&conn).map_err(|e| self.classify(e))?;
        Ok(conn)
    }

    /// Replace every row inside one transaction.
    fn write_rows(&self, conn: &mut Connection, records: &RecordMap) -> Result<(), StoreError> {
        let tx = conn.transaction().map_err(|e| self.classify(e))?;

        tx.execute("DELETE FROM monthly_records", [])
            .map_err(|e| self.classify(e))?;

        for (key, counts) in records {
            tx.execute(
                "INSERT INTO monthly_records (
                    year, month, pomodoros_completed, short_breaks, long_breaks
                ) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    key.year(),
                    key.month(),
                    to_column(counts.pomodoros_completed)?,
                    to_column(counts.short_breaks)?,
                    to_column(counts.long_breaks)?,
                ],
            )
            .map_err(|e| self.classify(e))?;
        }

        tx.commit().map_err(|e| self.classify(e))?;
        Ok(())
    }

    /// Write a fresh database beside the unreadable one, then swap it in.
    fn rebuild(&self, records: &RecordMap) -> Result<(), StoreError> {
        let tmp = temp_path(&self.path);
        match fs::remove_file(&tmp) {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                return Err(StoreError::unavailable(&tmp, e));
            }
            _ => {}
        }

        let mut conn = Connection::open(&tmp)?;
        init_schema(&conn)?;
        self.write_rows(&mut conn, records)?;
        conn.close().map_err(|(_, e)| StoreError::Sqlite(e))?;

        fs::rename(&tmp, &self.path).map_err(|e| StoreError::unavailable(&self.path, e))
    }

    /// Separate "this is not a database" from other SQLite failures.
    fn classify(&self, err: rusqlite::Error) -> StoreError {
        match err.sqlite_error_code() {
            Some(ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt) => {
                StoreError::corrupt(&self.path, err)
            }
            _ => StoreError::Sqlite(err),
        }
    }
}


/// Create the records table if needed.
fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS monthly_records (
            year INTEGER NOT NULL,
            month INTEGER NOT NULL,
            pomodoros_completed INTEGER NOT NULL,
            short_breaks INTEGER NOT NULL,
            long_breaks INTEGER NOT NULL,
            PRIMARY KEY (year, month)
        )",
        [],
    )?;
    Ok(())
}


impl RecordBackend for SqliteBackend {
    fn load(&self) -> Result<RecordMap, StoreError> {
        if !self.path.exists() {
            return Ok(RecordMap::new());
        }

        let conn = self.open()?;
        let mut stmt = conn
            .prepare(
                "SELECT year, month, pomodoros_completed, short_breaks, long_breaks
                 FROM monthly_records ORDER BY year, month",
            )
            .map_err(|e| self.classify(e))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })
            .map_err(|e| self.classify(e))?;

        let mut records = RecordMap::new();
        for row in rows {
            let (year, month, pomodoros, short_breaks, long_breaks) =
                row.map_err(|e| self.classify(e))?;

            let key = MonthKey::new(year, month).map_err(|e| StoreError::corrupt(&self.path, e))?;
            let counts = MonthlyCounts::try_new(pomodoros, short_breaks, long_breaks)
                .map_err(|e| StoreError::corrupt(&self.path, e))?;
            records.insert(key, counts);
        }

        Ok(records)
    }

    fn save(&self, records: &RecordMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::unavailable(parent, e))?;
        }

        let saved = self
            .open()
            .and_then(|mut conn| self.write_rows(&mut conn, records));

        match saved {
            Err(StoreError::Corrupt { reason, .. }) => {
                warn!(path = %self.path.display(), %reason, "replacing unreadable database");
                self.rebuild(records)
            }
            other => other,
        }
    }

    fn location(&self) -> &Path {
        &self.path
    }

    fn kind(&self) -> &'static str {
        "sqlite"
    }
}


/// SQLite integers are signed 64-bit.
fn to_column(value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| {
        ValidationError::new(format!("counter value {value} is too large to store")).into()
    })
}
