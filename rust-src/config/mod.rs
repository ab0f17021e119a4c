//! Configuration and settings for the Pomodoro tracker.

mod settings;

pub use settings::{
    backup_path,
    StoreSettings,
    DEFAULT_BIND_ADDR,
};
