//! Data Processor Module
//! Aggregates hospitals per state and merges them into the population table.

use crate::config::JoinPolicy;
use crate::data::loader::{require_columns, LoadError};
use polars::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

pub const HOSPITAL_NAME_COL: &str = "Hospital Name";
pub const HOSPITAL_STATE_COL: &str = "State";
pub const STATE_NAME_COL: &str = "State";
pub const STATE_CODE_COL: &str = "ST";
pub const POPULATION_COL: &str = "Population";
pub const HOSPITAL_COUNT_COL: &str = "Hospital Count";
pub const RATIO_COL: &str = "Population / Hospital Count";

const ROW_ORDER_COL: &str = "__row_order";
const HOSPITAL_TABLE: &str = "hospital table";
const POPULATION_TABLE: &str = "population table";

/// One merged row per state of the population table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateRow {
    pub state_name: String,
    pub state_code: String,
    pub hospital_count: u64,
    pub population: u64,
    /// `None` when the state has no hospitals.
    pub population_per_hospital: Option<f64>,
}

impl StateRow {
    pub fn new(state_name: &str, state_code: &str, hospital_count: u64, population: u64) -> Self {
        Self {
            state_name: state_name.to_string(),
            state_code: state_code.to_string(),
            hospital_count,
            population,
            population_per_hospital: per_hospital(population, hospital_count),
        }
    }
}

/// A hospital state code with no population row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedCode {
    pub state_code: String,
    pub hospital_count: u64,
}

/// The merged per-state table. Immutable once built; rows keep the
/// population file's order and are keyed by state name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateSummary {
    rows: Vec<StateRow>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
    #[serde(skip)]
    by_code: HashMap<String, usize>,
    unmatched: Vec<UnmatchedCode>,
}

impl StateSummary {
    /// Assemble a summary from already merged rows, enforcing unique names and codes.
    pub fn from_rows(rows: Vec<StateRow>, unmatched: Vec<UnmatchedCode>) -> Result<Self, LoadError> {
        let mut by_name = HashMap::with_capacity(rows.len());
        let mut by_code = HashMap::with_capacity(rows.len());

        for (idx, row) in rows.iter().enumerate() {
            if by_code.insert(row.state_code.clone(), idx).is_some() {
                return Err(LoadError::DuplicateStateCode {
                    file: POPULATION_TABLE.to_string(),
                    code: row.state_code.clone(),
                });
            }
            if by_name.insert(row.state_name.clone(), idx).is_some() {
                return Err(LoadError::DuplicateStateName {
                    name: row.state_name.clone(),
                });
            }
        }

        Ok(Self {
            rows,
            by_name,
            by_code,
            unmatched,
        })
    }

    pub fn rows(&self) -> &[StateRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// State codes in row order.
    pub fn state_codes(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.state_code.clone()).collect()
    }

    /// Look a row up by its key, the state name.
    pub fn get(&self, state_name: &str) -> Option<&StateRow> {
        self.by_name.get(state_name).map(|&idx| &self.rows[idx])
    }

    pub fn get_by_code(&self, state_code: &str) -> Option<&StateRow> {
        self.by_code.get(state_code).map(|&idx| &self.rows[idx])
    }

    /// Hospitals that made it into the table.
    pub fn total_hospitals(&self) -> u64 {
        self.rows.iter().map(|r| r.hospital_count).sum()
    }

    pub fn unmatched(&self) -> &[UnmatchedCode] {
        &self.unmatched
    }
}

/// `population / hospital_count`, undefined for states without hospitals.
pub fn per_hospital(population: u64, hospital_count: u64) -> Option<f64> {
    if hospital_count == 0 {
        None
    } else {
        Some(population as f64 / hospital_count as f64)
    }
}

/// Count hospitals per state code and left-join the counts onto the population table.
///
/// Hospital table columns: `Hospital Name`, `State` (two-letter code).
/// Population table columns: `State` (name), `ST` (code), `Population`.
pub fn build_state_summary(
    hospitals: &DataFrame,
    population: &DataFrame,
    policy: JoinPolicy,
) -> Result<StateSummary, LoadError> {
    require_columns(hospitals, HOSPITAL_TABLE, &[HOSPITAL_NAME_COL, HOSPITAL_STATE_COL])?;
    require_columns(
        population,
        POPULATION_TABLE,
        &[STATE_NAME_COL, STATE_CODE_COL, POPULATION_COL],
    )?;

    let counts = hospital_counts(hospitals)?;

    // The hospital file calls its code column `State`; it is renamed to `ST`
    // by `hospital_counts`. Both keys are normalized before the join, so the
    // trim in `extract_rows` never changes a code that took part in it.
    let merged = population
        .clone()
        .lazy()
        .with_row_index(ROW_ORDER_COL, None)
        .select([
            col(ROW_ORDER_COL),
            col(STATE_NAME_COL).cast(DataType::String),
            normalized_code(STATE_CODE_COL),
            col(POPULATION_COL).cast(DataType::Int64),
        ])
        .join(
            counts.clone().lazy(),
            [col(STATE_CODE_COL)],
            [col(STATE_CODE_COL)],
            JoinArgs::new(JoinType::Left),
        )
        .with_column(
            col(HOSPITAL_COUNT_COL)
                .fill_null(lit(0i64))
                .cast(DataType::Int64),
        )
        .with_column(
            when(col(HOSPITAL_COUNT_COL).gt(lit(0i64)))
                .then(
                    col(POPULATION_COL).cast(DataType::Float64)
                        / col(HOSPITAL_COUNT_COL).cast(DataType::Float64),
                )
                .otherwise(lit(f64::NAN))
                .alias(RATIO_COL),
        )
        .sort([ROW_ORDER_COL], SortMultipleOptions::default())
        .collect()?;

    let rows = extract_rows(&merged)?;
    let unmatched = unmatched_codes(&counts, &rows)?;

    if !unmatched.is_empty() {
        let codes: Vec<String> = unmatched.iter().map(|u| u.state_code.clone()).collect();
        let dropped: u64 = unmatched.iter().map(|u| u.hospital_count).sum();
        match policy {
            JoinPolicy::FailFast => {
                return Err(LoadError::JoinMismatch {
                    codes,
                    hospitals: dropped,
                })
            }
            JoinPolicy::WarnAndZeroFill => {
                warn!(
                    codes = %codes.join(","),
                    hospitals = dropped,
                    "hospital state codes have no population row; their hospitals are left out"
                );
            }
        }
    }

    for row in rows.iter().filter(|r| r.hospital_count == 0) {
        debug!(state = %row.state_code, "no hospitals matched; ratio left undefined");
    }

    StateSummary::from_rows(rows, unmatched)
}

/// State code column trimmed and upper-cased. Both sides of the join use it.
fn normalized_code(column: &str) -> Expr {
    col(column)
        .cast(DataType::String)
        .str()
        .strip_chars(lit(NULL))
        .str()
        .to_uppercase()
}

/// Hospitals per normalized state code, as columns `ST` and `Hospital Count`.
/// Rows without a code are ignored and only named hospitals are counted.
fn hospital_counts(hospitals: &DataFrame) -> Result<DataFrame, LoadError> {
    let counts = hospitals
        .clone()
        .lazy()
        .select([
            normalized_code(HOSPITAL_STATE_COL).alias(STATE_CODE_COL),
            col(HOSPITAL_NAME_COL),
        ])
        .filter(
            col(STATE_CODE_COL)
                .is_not_null()
                .and(col(STATE_CODE_COL).neq(lit(""))),
        )
        .group_by([col(STATE_CODE_COL)])
        .agg([col(HOSPITAL_NAME_COL)
            .count()
            .cast(DataType::Int64)
            .alias(HOSPITAL_COUNT_COL)])
        .collect()?;
    Ok(counts)
}

fn extract_rows(merged: &DataFrame) -> Result<Vec<StateRow>, LoadError> {
    let names = merged.column(STATE_NAME_COL)?.str()?;
    let codes = merged.column(STATE_CODE_COL)?.str()?;
    let populations = merged.column(POPULATION_COL)?.i64()?;
    let counts = merged.column(HOSPITAL_COUNT_COL)?.i64()?;
    let ratios = merged.column(RATIO_COL)?.f64()?;

    let invalid = |column: &str, i: usize| LoadError::InvalidValue {
        file: POPULATION_TABLE.to_string(),
        column: column.to_string(),
        row: i + 1,
    };

    let mut seen_codes = HashSet::new();
    let mut rows = Vec::with_capacity(merged.height());

    for i in 0..merged.height() {
        let state_name = names
            .get(i)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid(STATE_NAME_COL, i))?;
        let state_code = codes
            .get(i)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid(STATE_CODE_COL, i))?;
        let population = populations
            .get(i)
            .and_then(|p| u64::try_from(p).ok())
            .ok_or_else(|| invalid(POPULATION_COL, i))?;
        let hospital_count = counts
            .get(i)
            .and_then(|c| u64::try_from(c).ok())
            .unwrap_or(0);

        if !seen_codes.insert(state_code.to_string()) {
            return Err(LoadError::DuplicateStateCode {
                file: POPULATION_TABLE.to_string(),
                code: state_code.to_string(),
            });
        }

        rows.push(StateRow {
            state_name: state_name.to_string(),
            state_code: state_code.to_string(),
            hospital_count,
            population,
            population_per_hospital: ratios.get(i).filter(|v| v.is_finite()),
        });
    }

    Ok(rows)
}

/// Hospital codes absent from the merged rows, sorted by code.
fn unmatched_codes(counts: &DataFrame, rows: &[StateRow]) -> Result<Vec<UnmatchedCode>, LoadError> {
    let known: HashSet<&str> = rows.iter().map(|r| r.state_code.as_str()).collect();
    let codes = counts.column(STATE_CODE_COL)?.str()?;
    let hospital_counts = counts.column(HOSPITAL_COUNT_COL)?.i64()?;

    let mut unmatched: Vec<UnmatchedCode> = (0..counts.height())
        .filter_map(|i| {
            let code = codes.get(i)?;
            let count = hospital_counts.get(i).unwrap_or(0);
            if known.contains(code) || count <= 0 {
                None
            } else {
                Some(UnmatchedCode {
                    state_code: code.to_string(),
                    hospital_count: count as u64,
                })
            }
        })
        .collect();
    unmatched.sort_by(|a, b| a.state_code.cmp(&b.state_code));
    Ok(unmatched)
}
