//! Record subcommands - get, put and increment a month.

use anyhow::Result;

use crate::config::StoreSettings;
use crate::models::{MonthKey, MonthlyCounts, MonthlyRecord};


/// Show the record for one month.
pub fn get(settings: &StoreSettings, year: i64, month: i64) -> Result<()> {
    let record = settings.open_store().get(year, month)?;
    print_record(&record);
    Ok(())
}


/// Replace the record for one month.
pub fn put(
    settings: &StoreSettings,
    year: i64,
    month: i64,
    pomodoros: i64,
    short_breaks: i64,
    long_breaks: i64,
) -> Result<()> {
    let counts = MonthlyCounts::try_new(pomodoros, short_breaks, long_breaks)?;

    let record = settings.open_store().put(year, month, counts)?;
    println!("\x1b[32m+ Saved {}\x1b[0m", record.month_key);
    print_record(&record);
    Ok(())
}


/// Add completed pomodoros, to the current month unless one is given.
pub fn increment(settings: &StoreSettings, month: Option<(i64, i64)>, count: i64) -> Result<()> {
    let (year, month) = match month {
        Some(year_month) => year_month,
        None => {
            let current = MonthKey::current()?;
            (i64::from(current.year()), i64::from(current.month()))
        }
    };

    let record = settings.open_store().add_pomodoros(year, month, count)?;
    let noun = if count == 1 { "Pomodoro" } else { "Pomodoros" };
    println!(
        "\x1b[32m+ {count} {noun} added to {}\x1b[0m (total: {})",
        record.month_key, record.pomodoros_completed
    );
    Ok(())
}


fn print_record(record: &MonthlyRecord) {
    let counts = record.counts();
    println!("Month:               {}", record.month_key);
    println!("Pomodoros completed: {:>8}", counts.pomodoros_completed);
    println!("Short breaks:        {:>8}", counts.short_breaks);
    println!("Long breaks:         {:>8}", counts.long_breaks);
}
