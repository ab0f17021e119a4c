//! Month-keyed record store.
//!
//! Every operation runs a full load, (mutate, save) cycle against the
//! backend while holding one mutex, so concurrent callers in this process
//! never interleave their cycles. Separate processes sharing a file are not
//! coordinated.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use clap::ValueEnum;
use tracing::{debug, info, warn};

use crate::aggregation::{distinct_years, summarize, StatsFilter, StatsSummary};
use crate::models::{check_pomodoro_count, MonthKey, MonthlyCounts, MonthlyRecord, RecordMap};

use super::{RecordBackend, StoreError};


/// What to do when persisted state exists but cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CorruptionPolicy {
    /// Surface the corruption as an error
    #[default]
    Fail,
    /// Log a warning and carry on with an empty store
    Empty,
}


pub struct PomoStore {
    backend: Mutex<Box<dyn RecordBackend>>,
    on_corrupt: CorruptionPolicy,
    location: PathBuf,
    kind: &'static str,
}


impl PomoStore {
    pub fn new(backend: Box<dyn RecordBackend>, on_corrupt: CorruptionPolicy) -> Self {
        let location = backend.location().to_path_buf();
        let kind = backend.kind();

        Self {
            backend: Mutex::new(backend),
            on_corrupt,
            location,
            kind,
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Fetch the record for one month.
    pub fn get(&self, year: i64, month: i64) -> Result<MonthlyRecord, StoreError> {
        let key = MonthKey::new(year, month)?;

        let backend = self.lock();
        let records = self.load(&**backend)?;
        let counts = records.get(&key).copied().ok_or(StoreError::NotFound(key))?;

        debug!(month_key = %key, "record read");
        Ok(MonthlyRecord::new(key, counts))
    }

    /// Replace the whole record for one month, creating it if absent.
    pub fn put(
        &self,
        year: i64,
        month: i64,
        counts: MonthlyCounts,
    ) -> Result<MonthlyRecord, StoreError> {
        let key = MonthKey::new(year, month)?;

        let backend = self.lock();
        let mut records = self.load(&**backend)?;
        records.insert(key, counts);
        backend.save(&records)?;

        info!(
            month_key = %key,
            pomodoros_completed = counts.pomodoros_completed,
            short_breaks = counts.short_breaks,
            long_breaks = counts.long_breaks,
            "record replaced"
        );
        Ok(MonthlyRecord::new(key, counts))
    }

    /// Add one completed pomodoro to a month, starting from zero if absent.
    pub fn increment(&self, year: i64, month: i64) -> Result<MonthlyRecord, StoreError> {
        self.add_pomodoros(year, month, 1)
    }

    /// Add a batch of completed pomodoros to a month. Breaks are untouched.
    pub fn add_pomodoros(
        &self,
        year: i64,
        month: i64,
        count: i64,
    ) -> Result<MonthlyRecord, StoreError> {
        let key = MonthKey::new(year, month)?;
        let count = check_pomodoro_count(count)?;

        let backend = self.lock();
        let mut records = self.load(&**backend)?;
        let mut counts = records.get(&key).copied().unwrap_or_default();
        counts.add_pomodoros(count)?;
        records.insert(key, counts);
        backend.save(&records)?;

        info!(
            month_key = %key,
            added = count,
            pomodoros_completed = counts.pomodoros_completed,
            "pomodoros added"
        );
        Ok(MonthlyRecord::new(key, counts))
    }

    /// All records in month order.
    pub fn list(&self) -> Result<Vec<MonthlyRecord>, StoreError> {
        let records = self.snapshot()?;
        Ok(records
            .into_iter()
            .map(|(key, counts)| MonthlyRecord::new(key, counts))
            .collect())
    }

    /// Years with at least one record, newest first.
    pub fn years(&self) -> Result<Vec<i32>, StoreError> {
        Ok(distinct_years(&self.snapshot()?))
    }

    /// Totals over the records matching `filter`.
    pub fn stats(&self, filter: StatsFilter, current_year: i32) -> Result<StatsSummary, StoreError> {
        Ok(summarize(&self.snapshot()?, filter, current_year))
    }

    fn snapshot(&self) -> Result<RecordMap, StoreError> {
        let backend = self.lock();
        self.load(&**backend)
    }

    fn load(&self, backend: &dyn RecordBackend) -> Result<RecordMap, StoreError> {
        match backend.load() {
            Err(StoreError::Corrupt { path, reason }) if self.on_corrupt == CorruptionPolicy::Empty => {
                warn!(
                    path = %path.display(),
                    %reason,
                    "persisted records are unreadable, continuing with an empty store"
                );
                Ok(RecordMap::new())
            }
            other => other,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn RecordBackend>> {
        // Nothing in memory sits behind the lock; the backend is the source of truth.
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use tempfile::TempDir;

    use super::*;
    use crate::storage::{JsonFileBackend, SqliteBackend};

    fn json_store(dir: &TempDir) -> PomoStore {
        PomoStore::new(
            Box::new(JsonFileBackend::new(dir.path().join("pomo_data.json"))),
            CorruptionPolicy::Fail,
        )
    }

    fn counts(p: i64, s: i64, l: i64) -> MonthlyCounts {
        MonthlyCounts::try_new(p, s, l).unwrap()
    }

    #[test]
    fn test_get_absent_is_not_found() {
        let tmp_dir = TempDir::new().unwrap();
        let store = json_store(&tmp_dir);

        for (year, month) in [(2020, 1), (2024, 3), (2100, 12)] {
            let err = store.get(year, month).unwrap_err();
            assert!(matches!(err, StoreError::NotFound(_)));
        }
    }

    #[test]
    fn test_put_then_get() {
        let tmp_dir = TempDir::new().unwrap();
        let store = json_store(&tmp_dir);

        let put = store.put(2024, 3, counts(5, 2, 1)).unwrap();
        let got = store.get(2024, 3).unwrap();

        assert_eq!(put, got);
        assert_eq!(
            got,
            MonthlyRecord {
                month_key: "2024-03".to_string(),
                pomodoros_completed: 5,
                short_breaks: 2,
                long_breaks: 1,
            }
        );
    }

    #[test]
    fn test_put_is_idempotent() {
        let tmp_dir = TempDir::new().unwrap();
        let store = json_store(&tmp_dir);
        let path = tmp_dir.path().join("pomo_data.json");

        let first = store.put(2024, 3, counts(7, 3, 1)).unwrap();
        let after_first = std::fs::read_to_string(&path).unwrap();
        let second = store.put(2024, 3, counts(7, 3, 1)).unwrap();
        let after_second = std::fs::read_to_string(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(after_first, after_second);
    }

    #[test]
    fn test_put_is_full_overwrite() {
        let tmp_dir = TempDir::new().unwrap();
        let store = json_store(&tmp_dir);

        store.put(2024, 3, counts(9, 4, 2)).unwrap();
        store.put(2024, 3, counts(1, 0, 0)).unwrap();

        assert_eq!(store.get(2024, 3).unwrap().counts(), counts(1, 0, 0));
    }

    #[test]
    fn test_invalid_put_does_not_touch_storage() {
        let tmp_dir = TempDir::new().unwrap();
        let store = json_store(&tmp_dir);
        store.put(2024, 3, counts(5, 2, 1)).unwrap();

        let err = store.put(2019, 3, counts(1, 1, 1)).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        let err = store.put(2024, 13, counts(1, 1, 1)).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        assert_eq!(store.list().unwrap().len(), 1);
        assert_eq!(store.get(2024, 3).unwrap().counts(), counts(5, 2, 1));
    }

    #[test]
    fn test_increment_creates_record() {
        let tmp_dir = TempDir::new().unwrap();
        let store = json_store(&tmp_dir);

        let record = store.increment(2024, 3).unwrap();
        assert_eq!(record.counts(), counts(1, 0, 0));
        assert_eq!(record.month_key, "2024-03");
    }

    #[test]
    fn test_increment_twice() {
        let tmp_dir = TempDir::new().unwrap();
        let store = json_store(&tmp_dir);

        store.increment(2024, 3).unwrap();
        store.increment(2024, 3).unwrap();

        assert_eq!(store.get(2024, 3).unwrap().pomodoros_completed, 2);
    }

    #[test]
    fn test_increment_keeps_breaks() {
        let tmp_dir = TempDir::new().unwrap();
        let store = json_store(&tmp_dir);
        store.put(2024, 3, counts(5, 2, 1)).unwrap();

        for _ in 0..3 {
            store.increment(2024, 3).unwrap();
        }

        assert_eq!(store.get(2024, 3).unwrap().counts(), counts(8, 2, 1));
    }

    #[test]
    fn test_add_pomodoros_batch() {
        let tmp_dir = TempDir::new().unwrap();
        let store = json_store(&tmp_dir);
        store.put(2024, 3, counts(5, 2, 1)).unwrap();

        let record = store.add_pomodoros(2024, 3, 4).unwrap();
        assert_eq!(record.counts(), counts(9, 2, 1));

        let fresh = store.add_pomodoros(2024, 4, 3).unwrap();
        assert_eq!(fresh.counts(), counts(3, 0, 0));
        assert_eq!(store.get(2024, 4).unwrap(), fresh);
    }

    #[test]
    fn test_add_pomodoros_rejects_before_io() {
        let tmp_dir = TempDir::new().unwrap();
        let store = json_store(&tmp_dir);

        let err = store.add_pomodoros(2024, 3, -1).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        let err = store.add_pomodoros(2101, 3, 2).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(!tmp_dir.path().join("pomo_data.json").exists());

        store
            .put(2024, 3, MonthlyCounts { pomodoros_completed: u64::MAX - 1, ..Default::default() })
            .unwrap();
        let err = store.add_pomodoros(2024, 3, 2).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.get(2024, 3).unwrap().pomodoros_completed, u64::MAX - 1);
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let tmp_dir = TempDir::new().unwrap();
        let store = Arc::new(json_store(&tmp_dir));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..10 {
                        store.increment(2024, 5).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let record = store.get(2024, 5).unwrap();
        assert_eq!(record.counts(), counts(80, 0, 0));
    }

    #[test]
    fn test_corrupt_store_fails_by_default() {
        let tmp_dir = TempDir::new().unwrap();
        std::fs::write(tmp_dir.path().join("pomo_data.json"), "not json").unwrap();
        let store = json_store(&tmp_dir);

        assert!(matches!(store.get(2024, 3), Err(StoreError::Corrupt { .. })));
        assert!(matches!(store.increment(2024, 3), Err(StoreError::Corrupt { .. })));
        assert_eq!(
            std::fs::read_to_string(tmp_dir.path().join("pomo_data.json")).unwrap(),
            "not json"
        );
    }

    #[test]
    fn test_corrupt_store_as_empty_when_asked() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("pomo_data.json");
        std::fs::write(&path, "not json").unwrap();
        let store = PomoStore::new(Box::new(JsonFileBackend::new(&path)), CorruptionPolicy::Empty);

        assert!(matches!(store.get(2024, 3), Err(StoreError::NotFound(_))));
        assert_eq!(store.increment(2024, 3).unwrap().pomodoros_completed, 1);
        assert_eq!(store.get(2024, 3).unwrap().pomodoros_completed, 1);
    }

    #[test]
    fn test_corrupt_sqlite_store_as_empty_when_asked() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("pomo_data.db");
        std::fs::write(&path, "not a sqlite file\n".repeat(128)).unwrap();

        let strict = PomoStore::new(Box::new(SqliteBackend::new(&path)), CorruptionPolicy::Fail);
        assert!(matches!(strict.increment(2024, 3), Err(StoreError::Corrupt { .. })));

        let store = PomoStore::new(Box::new(SqliteBackend::new(&path)), CorruptionPolicy::Empty);
        assert!(matches!(store.get(2024, 3), Err(StoreError::NotFound(_))));
        assert_eq!(store.increment(2024, 3).unwrap().pomodoros_completed, 1);
        assert_eq!(store.get(2024, 3).unwrap().pomodoros_completed, 1);

        assert_eq!(strict.get(2024, 3).unwrap().pomodoros_completed, 1);
    }

    #[test]
    fn test_list_and_years() {
        let tmp_dir = TempDir::new().unwrap();
        let store = json_store(&tmp_dir);
        store.put(2024, 3, counts(5, 2, 1)).unwrap();
        store.put(2023, 12, counts(2, 1, 0)).unwrap();
        store.increment(2024, 1).unwrap();

        let keys: Vec<_> = store.list().unwrap().into_iter().map(|r| r.month_key).collect();
        assert_eq!(keys, ["2023-12", "2024-01", "2024-03"]);
        assert_eq!(store.years().unwrap(), [2024, 2023]);
    }

    #[test]
    fn test_sqlite_store_semantics() {
        let tmp_dir = TempDir::new().unwrap();
        let store = PomoStore::new(
            Box::new(SqliteBackend::new(tmp_dir.path().join("pomo_data.db"))),
            CorruptionPolicy::Fail,
        );

        assert!(matches!(store.get(2024, 3), Err(StoreError::NotFound(_))));
        store.put(2024, 3, counts(5, 2, 1)).unwrap();
        store.increment(2024, 3).unwrap();
        assert_eq!(store.get(2024, 3).unwrap().counts(), counts(6, 2, 1));
        assert_eq!(store.kind(), "sqlite");
    }
}
