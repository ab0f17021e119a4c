//! Storage layer for monthly Pomodoro records.

mod database;
mod error;
mod json_file;
mod store;

use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::models::RecordMap;

pub use database::SqliteBackend;
pub use error::StoreError;
pub use json_file::JsonFileBackend;
pub use store::{CorruptionPolicy, PomoStore};


/// Whole-store persistence.
///
/// `load` returns an empty map when nothing has been persisted yet and
/// `StoreError::Corrupt` when something was persisted but cannot be read
/// back. `save` replaces everything that was persisted before.
pub trait RecordBackend: Send {
    fn load(&self) -> Result<RecordMap, StoreError>;

    fn save(&self, records: &RecordMap) -> Result<(), StoreError>;

    /// Where the records live, for messages and logs.
    fn location(&self) -> &Path;

    fn kind(&self) -> &'static str;
}


/// Scratch file next to `path` for write-then-rename saves.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}


/// Available storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Single pretty-printed JSON file
    Json,
    /// SQLite database with one row per month
    Sqlite,
}


impl BackendKind {
    /// Default file name for this backend.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            BackendKind::Json => "pomo_data.json",
            BackendKind::Sqlite => "pomo_data.db",
        }
    }

    pub fn open(&self, path: PathBuf) -> Box<dyn RecordBackend> {
        match self {
            BackendKind::Json => Box::new(JsonFileBackend::new(path)),
            BackendKind::Sqlite => Box::new(SqliteBackend::new(path)),
        }
    }
}
