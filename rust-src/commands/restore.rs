//! Restore command - bring back the data file from its backup.

use std::fs;

use anyhow::{Context, Result};

use crate::config::{backup_path, StoreSettings};


/// Restore the data file from backup.
pub fn run(settings: &StoreSettings) -> Result<()> {
    let data_path = &settings.data_path;
    let backup = backup_path(data_path);

    println!("\x1b[1m\x1b[36mRestoring Pomodoro data\x1b[0m\n");

    if !backup.exists() {
        println!("\x1b[31mNo backup found at {}\x1b[0m", backup.display());
        println!("\x1b[2mBackups are created when you run 'pomo remove'.\x1b[0m");
        return Ok(());
    }

    let metadata = fs::metadata(&backup)
        .with_context(|| format!("Failed to read {}", backup.display()))?;

    println!("Backup: {}", backup.display());
    println!("Size: {} bytes", metadata.len());

    if data_path.exists() {
        println!("\n\x1b[33mWarning: Current data file will be overwritten.\x1b[0m");
    }

    if let Some(parent) = data_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::copy(&backup, data_path)
        .with_context(|| format!("Failed to restore {}", data_path.display()))?;

    println!("\n\x1b[32m+ Pomodoro data restored from backup\x1b[0m");
    println!("Data file: {}", data_path.display());

    Ok(())
}
