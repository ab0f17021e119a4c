//! Aggregation layer for monthly statistics.

mod monthly_stats;

pub use monthly_stats::{
    distinct_years,
    summarize,
    StatsFilter,
    StatsSummary,
};
