//! Monthly Pomodoro record models.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;


/// Earliest year accepted for a month key.
pub const MIN_YEAR: i64 = 2020;

/// Latest year accepted for a month key.
pub const MAX_YEAR: i64 = 2100;


/// Input rejected before any storage access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(String);


impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}


/// Check that `year` falls in the supported range.
pub fn check_year(year: i64) -> Result<i32, ValidationError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ValidationError::new(format!(
            "year must be between {MIN_YEAR} and {MAX_YEAR}, got {year}"
        )));
    }
    Ok(year as i32)
}


/// Check that `month` is a calendar month number.
pub fn check_month(month: i64) -> Result<u32, ValidationError> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::new(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }
    Ok(month as u32)
}


/// Calendar month identifier, rendered as `YYYY-MM`.
///
/// Ordering is chronological, which keeps persisted output stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}


impl MonthKey {
    /// Validate a `(year, month)` pair.
    pub fn new(year: i64, month: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            year: check_year(year)?,
            month: check_month(month)?,
        })
    }

    /// The current local calendar month.
    pub fn current() -> Result<Self, ValidationError> {
        let today = Local::now().date_naive();
        Self::new(i64::from(today.year()), i64::from(today.month()))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}


impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}


impl FromStr for MonthKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::new(format!("month key must look like YYYY-MM, got {s:?}"));

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: i64 = year.parse().map_err(|_| invalid())?;
        let month: i64 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}


/// The three counters tracked per month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonthlyCounts {
    pub pomodoros_completed: u64,
    pub short_breaks: u64,
    pub long_breaks: u64,
}


impl MonthlyCounts {
    /// Build counts from signed input, rejecting negatives.
    pub fn try_new(
        pomodoros_completed: i64,
        short_breaks: i64,
        long_breaks: i64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            pomodoros_completed: non_negative("pomodoros_completed", pomodoros_completed)?,
            short_breaks: non_negative("short_breaks", short_breaks)?,
            long_breaks: non_negative("long_breaks", long_breaks)?,
        })
    }

    /// Add `count` completed pomodoros, leaving the break counters alone.
    /// Nothing changes on overflow.
    pub fn add_pomodoros(&mut self, count: u64) -> Result<(), ValidationError> {
        self.pomodoros_completed = self
            .pomodoros_completed
            .checked_add(count)
            .ok_or_else(|| ValidationError::new("pomodoros_completed would overflow"))?;
        Ok(())
    }
}


/// Validate a batch of pomodoros to add.
pub fn check_pomodoro_count(count: i64) -> Result<u64, ValidationError> {
    non_negative("pomodoros", count)
}


fn non_negative(field: &str, value: i64) -> Result<u64, ValidationError> {
    u64::try_from(value)
        .map_err(|_| ValidationError::new(format!("{field} must be >= 0, got {value}")))
}


/// A month's counters together with their key, as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub month_key: String,
    pub pomodoros_completed: u64,
    pub short_breaks: u64,
    pub long_breaks: u64,
}


impl MonthlyRecord {
    pub fn new(key: MonthKey, counts: MonthlyCounts) -> Self {
        Self {
            month_key: key.to_string(),
            pomodoros_completed: counts.pomodoros_completed,
            short_breaks: counts.short_breaks,
            long_breaks: counts.long_breaks,
        }
    }

    pub fn counts(&self) -> MonthlyCounts {
        MonthlyCounts {
            pomodoros_completed: self.pomodoros_completed,
            short_breaks: self.short_breaks,
            long_breaks: self.long_breaks,
        }
    }
}


/// Whole store contents, keyed by month.
pub type RecordMap = BTreeMap<MonthKey, MonthlyCounts>;
