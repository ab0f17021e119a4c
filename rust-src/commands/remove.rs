//! Remove command - delete the data file after backing it up.

use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::config::{backup_path, StoreSettings};


/// Remove the data file.
pub fn run(settings: &StoreSettings, force: bool) -> Result<()> {
    let data_path = &settings.data_path;

    if !data_path.exists() {
        println!("\x1b[33mNo data file found at {}\x1b[0m", data_path.display());
        return Ok(());
    }

    let metadata = fs::metadata(data_path)
        .with_context(|| format!("Failed to read {}", data_path.display()))?;

    println!("\x1b[1m\x1b[36mRemoving Pomodoro data\x1b[0m\n");
    println!("Data file: {}", data_path.display());
    println!("Size: {} bytes", metadata.len());

    if !force {
        println!("\n\x1b[1m\x1b[31mWARNING: This will delete all recorded Pomodoro data!\x1b[0m");
        println!("\x1b[33mA backup is kept until the next removal.\x1b[0m\n");

        print!("Type 'delete' to confirm: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if input.trim().to_lowercase() != "delete" {
            println!("\x1b[33mCancelled\x1b[0m");
            return Ok(());
        }
    }

    // Create backup before deletion
    let backup = backup_path(data_path);
    fs::copy(data_path, &backup)
        .with_context(|| format!("Failed to back up to {}", backup.display()))?;
    println!("\n\x1b[2mBackup created: {}\x1b[0m", backup.display());

    fs::remove_file(data_path)
        .with_context(|| format!("Failed to delete {}", data_path.display()))?;

    println!("\x1b[32m+ Pomodoro data deleted\x1b[0m");
    println!("\x1b[2mTo restore: pomo restore\x1b[0m");

    Ok(())
}
