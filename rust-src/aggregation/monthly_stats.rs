//! Summary statistics across monthly records.

use serde::Serialize;

use crate::models::{check_month, check_year, MonthKey, RecordMap, ValidationError};


/// Optional year / month restriction for a summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
}


impl StatsFilter {
    pub fn new(year: Option<i64>, month: Option<i64>) -> Result<Self, ValidationError> {
        Ok(Self {
            year: year.map(check_year).transpose()?,
            month: month.map(check_month).transpose()?,
        })
    }

    pub fn is_unfiltered(&self) -> bool {
        self.year.is_none() && self.month.is_none()
    }

    fn matches(&self, key: &MonthKey) -> bool {
        self.year.map_or(true, |y| key.year() == y) && self.month.map_or(true, |m| key.month() == m)
    }
}


/// Pomodoros completed in one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBreakdown {
    pub month_key: String,
    pub pomodoros_completed: u64,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub total_pomodoros: u64,
    pub total_short_breaks: u64,
    pub total_long_breaks: u64,
    pub months_tracked: usize,
    pub monthly_breakdown: Vec<MonthBreakdown>,
    pub filters: StatsFilter,
}


/// Summarize the records matching `filter`.
///
/// Without a filter the totals cover everything but the breakdown is limited
/// to `current_year`.
pub fn summarize(records: &RecordMap, filter: StatsFilter, current_year: i32) -> StatsSummary {
    let mut summary = StatsSummary {
        total_pomodoros: 0,
        total_short_breaks: 0,
        total_long_breaks: 0,
        months_tracked: 0,
        monthly_breakdown: Vec::new(),
        filters: filter,
    };

    for (key, counts) in records.iter().filter(|(key, _)| filter.matches(key)) {
        summary.total_pomodoros = summary.total_pomodoros.saturating_add(counts.pomodoros_completed);
        summary.total_short_breaks = summary.total_short_breaks.saturating_add(counts.short_breaks);
        summary.total_long_breaks = summary.total_long_breaks.saturating_add(counts.long_breaks);
        summary.months_tracked += 1;

        if !filter.is_unfiltered() || key.year() == current_year {
            summary.monthly_breakdown.push(MonthBreakdown {
                month_key: key.to_string(),
                pomodoros_completed: counts.pomodoros_completed,
            });
        }
    }

    summary
}


/// Distinct years present in the records, newest first.
pub fn distinct_years(records: &RecordMap) -> Vec<i32> {
    let mut years: Vec<i32> = records.keys().map(MonthKey::year).collect();
    years.dedup();
    years.reverse();
    years
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MonthlyCounts;

    fn sample_records() -> RecordMap {
        let mut records = RecordMap::new();
        for (year, month, p, s, l) in [
            (2023, 11, 10, 6, 2),
            (2023, 12, 20, 12, 4),
            (2024, 1, 5, 3, 1),
            (2024, 3, 7, 4, 1),
        ] {
            records.insert(
                MonthKey::new(year, month).unwrap(),
                MonthlyCounts::try_new(p, s, l).unwrap(),
            );
        }
        records
    }

    #[test]
    fn test_unfiltered_totals_and_current_year_breakdown() {
        let summary = summarize(&sample_records(), StatsFilter::default(), 2024);

        assert_eq!(summary.total_pomodoros, 42);
        assert_eq!(summary.total_short_breaks, 25);
        assert_eq!(summary.total_long_breaks, 8);
        assert_eq!(summary.months_tracked, 4);

        let keys: Vec<_> = summary.monthly_breakdown.iter().map(|b| b.month_key.as_str()).collect();
        assert_eq!(keys, ["2024-01", "2024-03"]);
    }

    #[test]
    fn test_year_filter() {
        let filter = StatsFilter::new(Some(2023), None).unwrap();
        let summary = summarize(&sample_records(), filter, 2024);

        assert_eq!(summary.total_pomodoros, 30);
        assert_eq!(summary.months_tracked, 2);
        assert_eq!(summary.monthly_breakdown.len(), 2);
    }

    #[test]
    fn test_month_filter_spans_years() {
        let filter = StatsFilter::new(None, Some(3)).unwrap();
        let summary = summarize(&sample_records(), filter, 2024);

        assert_eq!(summary.total_pomodoros, 7);
        assert_eq!(
            summary.monthly_breakdown,
            vec![MonthBreakdown {
                month_key: "2024-03".to_string(),
                pomodoros_completed: 7,
            }]
        );
    }

    #[test]
    fn test_empty_records() {
        let summary = summarize(&RecordMap::new(), StatsFilter::default(), 2024);
        assert_eq!(summary.total_pomodoros, 0);
        assert_eq!(summary.months_tracked, 0);
        assert!(summary.monthly_breakdown.is_empty());
    }

    #[test]
    fn test_filter_validation() {
        assert!(StatsFilter::new(Some(1999), None).is_err());
        assert!(StatsFilter::new(None, Some(0)).is_err());
        assert!(StatsFilter::new(Some(2024), Some(12)).is_ok());
    }

    #[test]
    fn test_distinct_years() {
        assert_eq!(distinct_years(&sample_records()), [2024, 2023]);
        assert!(distinct_years(&RecordMap::new()).is_empty());
    }
}
