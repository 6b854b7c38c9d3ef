//! Data module - CSV loading, merging and filtering

mod cache;
mod filter;
mod loader;
mod processor;

pub use cache::{get_or_load, SummaryCache};
pub use filter::{filter_by_states, FilteredSummary};
pub use loader::{load_state_summary, read_csv, require_columns, LoadError};
pub use processor::{
    build_state_summary, per_hospital, StateRow, StateSummary, UnmatchedCode,
    HOSPITAL_COUNT_COL, HOSPITAL_NAME_COL, HOSPITAL_STATE_COL, POPULATION_COL, RATIO_COL,
    STATE_CODE_COL, STATE_NAME_COL,
};
