//! Hospital Dashboard - population per hospital by US state
//!
//! Merges a hospital list with state populations into a per-state summary
//! and shows it as a tile map, a scatter plot with trendline and a bar chart,
//! filtered by a state selection.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod logging;
pub mod stats;
