//! Stats module - aggregates and recommendations

mod calculator;

pub use calculator::{DeviationStats, StatsCalculator, Summary, Trend, NO_DATA_RECOMMENDATION};
