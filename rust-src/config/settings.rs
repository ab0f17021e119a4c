//! Application settings and path defaults.

use std::path::{Path, PathBuf};

use crate::storage::{BackendKind, CorruptionPolicy, PomoStore};


/// Default listen address for `pomo serve`.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";


/// Get the directory holding Pomodoro data.
pub fn get_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pomo")
}


/// Get the default data file for a backend.
pub fn get_data_path(backend: BackendKind) -> PathBuf {
    get_data_dir().join(backend.default_file_name())
}


/// Backup location used by `remove` and `restore`.
pub fn backup_path(data_path: &Path) -> PathBuf {
    let mut name = data_path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}


/// Where and how records are stored.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub backend: BackendKind,
    pub data_path: PathBuf,
    pub on_corrupt: CorruptionPolicy,
}


impl StoreSettings {
    pub fn new(
        backend: BackendKind,
        data_path: Option<PathBuf>,
        on_corrupt: CorruptionPolicy,
    ) -> Self {
        Self {
            backend,
            data_path: data_path.unwrap_or_else(|| get_data_path(backend)),
            on_corrupt,
        }
    }

    pub fn open_store(&self) -> PomoStore {
        PomoStore::new(self.backend.open(self.data_path.clone()), self.on_corrupt)
    }
}
