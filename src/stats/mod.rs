//! Stats module - trendline fitting

mod calculator;

pub use calculator::{compute_correlation, StatsCalculator, TrendlineFit};
