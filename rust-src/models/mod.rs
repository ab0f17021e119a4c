//! Domain models for monthly Pomodoro tracking.

mod monthly_record;

pub use monthly_record::{
    check_month,
    check_pomodoro_count,
    check_year,
    MAX_YEAR,
    MIN_YEAR,
    MonthKey,
    MonthlyCounts,
    MonthlyRecord,
    RecordMap,
    ValidationError,
};
