//! CSV Data Loader Module
//! Reads the hospital and population files with Polars and hands them to the merger.

use crate::config::DashboardConfig;
use crate::data::processor::{build_state_summary, StateSummary};
use crate::data::processor::{
    HOSPITAL_NAME_COL, HOSPITAL_STATE_COL, POPULATION_COL, STATE_CODE_COL, STATE_NAME_COL,
};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot read {}: {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{file}: required column `{column}` is missing")]
    DataFormat { file: String, column: String },
    #[error("{file}: row {row} has no usable value in column `{column}`")]
    InvalidValue {
        file: String,
        column: String,
        row: usize,
    },
    #[error("{file}: state code `{code}` appears more than once")]
    DuplicateStateCode { file: String, code: String },
    #[error("State name `{name}` appears more than once")]
    DuplicateStateName { name: String },
    #[error(
        "{hospitals} hospitals have state codes missing from the population table: {}",
        codes.join(", ")
    )]
    JoinMismatch { codes: Vec<String>, hospitals: u64 },
    #[error("Failed to process CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// Load a CSV file using Polars.
///
/// The file is opened first so a missing or unreadable path is reported by
/// name instead of as a generic Polars error.
pub fn read_csv(path: &Path) -> Result<DataFrame, LoadError> {
    File::open(path).map_err(|source| LoadError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;

    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .finish()?
        .collect()?;

    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "read csv"
    );
    Ok(df)
}

/// Fail with `DataFormat` on the first column of `required` that `df` lacks.
pub fn require_columns(df: &DataFrame, file: &str, required: &[&str]) -> Result<(), LoadError> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    match required
        .iter()
        .find(|column| !present.iter().any(|p| p == *column))
    {
        Some(column) => Err(LoadError::DataFormat {
            file: file.to_string(),
            column: column.to_string(),
        }),
        None => Ok(()),
    }
}

/// Read both input files and build the per-state summary.
pub fn load_state_summary(config: &DashboardConfig) -> Result<StateSummary, LoadError> {
    let started = Instant::now();

    let hospitals = read_csv(&config.hospital_csv)?;
    require_columns(
        &hospitals,
        &file_label(&config.hospital_csv),
        &[HOSPITAL_NAME_COL, HOSPITAL_STATE_COL],
    )?;

    let population = read_csv(&config.population_csv)?;
    require_columns(
        &population,
        &file_label(&config.population_csv),
        &[STATE_NAME_COL, STATE_CODE_COL, POPULATION_COL],
    )?;

    let summary = build_state_summary(&hospitals, &population, config.join_policy)?;

    info!(
        states = summary.len(),
        hospitals = summary.total_hospitals(),
        unmatched = summary.unmatched().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "state summary built"
    );
    Ok(summary)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_names_the_path() {
        let path = Path::new("definitely/not/here.csv");
        match read_csv(path) {
            Err(LoadError::FileNotFound { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn require_columns_reports_first_missing() {
        let df = df!("State" => &["California"], "Population" => &[39_000_000i64]).unwrap();
        let err = require_columns(&df, "pop.csv", &["State", "ST", "Population"]).unwrap_err();
        match err {
            LoadError::DataFormat { file, column } => {
                assert_eq!(file, "pop.csv");
                assert_eq!(column, "ST");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(require_columns(&df, "pop.csv", &["State", "Population"]).is_ok());
    }

    #[test]
    fn error_messages_are_readable() {
        let err = LoadError::JoinMismatch {
            codes: vec!["GU".to_string(), "VI".to_string()],
            hospitals: 3,
        };
        assert_eq!(
            err.to_string(),
            "3 hospitals have state codes missing from the population table: GU, VI"
        );
    }
}
