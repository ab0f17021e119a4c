//! Whole-file JSON backend.
//!
//! The file holds one JSON object keyed by `YYYY-MM`, each value carrying the
//! three counters. Every save rewrites the file through a temp file and a
//! rename, so an interrupted write never truncates the previous state.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::models::{MonthKey, MonthlyCounts, RecordMap};

use super::{temp_path, RecordBackend, StoreError};


/// On-disk layout: month key string to counters.
type FileLayout = BTreeMap<String, MonthlyCounts>;


pub struct JsonFileBackend {
    path: PathBuf,
}


impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}


impl RecordBackend for JsonFileBackend {
    fn load(&self) -> Result<RecordMap, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(RecordMap::new()),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(StoreError::corrupt(&self.path, e));
            }
            Err(e) => return Err(StoreError::unavailable(&self.path, e)),
        };

        if raw.trim().is_empty() {
            return Ok(RecordMap::new());
        }

        let layout: FileLayout =
            serde_json::from_str(&raw).map_err(|e| StoreError::corrupt(&self.path, e))?;

        let mut records = RecordMap::new();
        for (key, counts) in layout {
            let month_key: MonthKey = key
                .parse()
                .map_err(|e| StoreError::corrupt(&self.path, e))?;
            records.insert(month_key, counts);
        }

        Ok(records)
    }

    fn save(&self, records: &RecordMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::unavailable(parent, e))?;
        }

        let layout: FileLayout = records
            .iter()
            .map(|(key, counts)| (key.to_string(), *counts))
            .collect();
        let bytes = encode_pretty(&layout).map_err(|e| StoreError::unavailable(&self.path, e))?;

        let tmp = temp_path(&self.path);
        write_synced(&tmp, &bytes).map_err(|e| StoreError::unavailable(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::unavailable(&self.path, e))?;

        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }

    fn kind(&self) -> &'static str {
        "json"
    }
}


/// Serialize with four-space indentation and a trailing newline.
fn encode_pretty(layout: &FileLayout) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    layout.serialize(&mut serializer)?;
    bytes.push(b'\n');
    Ok(bytes)
}


fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
