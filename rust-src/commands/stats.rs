//! Stats command - show totals and monthly breakdown.

use anyhow::Result;
use chrono::{Datelike, Local};

use crate::aggregation::StatsFilter;
use crate::config::StoreSettings;


/// Run the stats command.
pub fn run(settings: &StoreSettings, year: Option<i64>, month: Option<i64>) -> Result<()> {
    let filter = StatsFilter::new(year, month)?;
    let current_year = Local::now().year();

    let store = settings.open_store();
    let stats = store.stats(filter, current_year)?;

    if stats.months_tracked == 0 {
        if filter.is_unfiltered() {
            println!("No Pomodoro data found. Run 'pomo increment' to start tracking.");
        } else {
            println!("No Pomodoro data found for the selected period.");
        }
        return Ok(());
    }

    // Header
    println!("\n{}", "=".repeat(60));
    println!("{:^60}", "Pomodoro Statistics");
    println!("{}\n", "=".repeat(60));

    // Summary Statistics
    println!("SUMMARY");
    println!("{}", "-".repeat(40));
    println!("  Pomodoros:           {:>15}", format_number(stats.total_pomodoros));
    println!("  Short Breaks:        {:>15}", format_number(stats.total_short_breaks));
    println!("  Long Breaks:         {:>15}", format_number(stats.total_long_breaks));
    println!("  Months Tracked:      {:>15}", format_number(stats.months_tracked as u64));

    if let Some(y) = filter.year {
        println!("  Year:                {:>15}", y);
    }
    if let Some(m) = filter.month {
        println!("  Month:               {:>15}", m);
    }

    // Averages
    println!("\nAVERAGES");
    println!("{}", "-".repeat(40));
    let months = stats.months_tracked as u64;
    println!(
        "  Pomodoros per Month: {:>15}",
        format_number(stats.total_pomodoros / months)
    );
    let breaks = stats.total_short_breaks.saturating_add(stats.total_long_breaks);
    if stats.total_pomodoros > 0 {
        println!(
            "  Breaks per Pomodoro: {:>15.2}",
            breaks as f64 / stats.total_pomodoros as f64
        );
    }

    // Monthly breakdown
    if !stats.monthly_breakdown.is_empty() {
        let heading = if filter.is_unfiltered() {
            format!("MONTHLY BREAKDOWN ({current_year})")
        } else {
            "MONTHLY BREAKDOWN".to_string()
        };
        println!("\n{heading}");
        println!("{}", "-".repeat(60));

        let peak = stats
            .monthly_breakdown
            .iter()
            .map(|m| m.pomodoros_completed)
            .max()
            .unwrap_or(0);

        for entry in &stats.monthly_breakdown {
            println!(
                "  {:10} {:>10}  {}",
                entry.month_key,
                format_number(entry.pomodoros_completed),
                bar(entry.pomodoros_completed, peak, 30)
            );
        }
    }

    println!("\n{}", "-".repeat(60));
    println!("Data: {} ({})", store.location().display(), store.kind());

    Ok(())
}


/// Format a number with commas.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result
}


/// Horizontal bar scaled against `peak`.
fn bar(value: u64, peak: u64, width: usize) -> String {
    if peak == 0 {
        return String::new();
    }
    let filled = ((value as f64 / peak as f64) * width as f64).round() as usize;
    "#".repeat(filled.min(width))
}
