//! Dashboard configuration
//! Input file locations and join policy, read from the environment.

use serde::Serialize;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_HOSPITAL_CSV: &str = "hospital_general_information.csv";
pub const DEFAULT_POPULATION_CSV: &str = "us_populaton_by_state.csv";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("DASHBOARD_JOIN_POLICY must be `warn` or `fail`, got `{0}`")]
    InvalidJoinPolicy(String),
}

/// What to do with hospital state codes that have no population row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum JoinPolicy {
    /// Log the unmatched codes and keep building; their hospitals are left out.
    #[default]
    WarnAndZeroFill,
    /// Refuse to build the summary.
    FailFast,
}

impl FromStr for JoinPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" | "zero-fill" => Ok(JoinPolicy::WarnAndZeroFill),
            "fail" | "fail-fast" => Ok(JoinPolicy::FailFast),
            other => Err(ConfigError::InvalidJoinPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for JoinPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinPolicy::WarnAndZeroFill => write!(f, "warn"),
            JoinPolicy::FailFast => write!(f, "fail"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub hospital_csv: PathBuf,
    pub population_csv: PathBuf,
    pub join_policy: JoinPolicy,
    pub log_filter: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            hospital_csv: PathBuf::from(DEFAULT_HOSPITAL_CSV),
            population_csv: PathBuf::from(DEFAULT_POPULATION_CSV),
            join_policy: JoinPolicy::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("DASHBOARD_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let hospital_csv = lookup("DASHBOARD_HOSPITAL_CSV")
            .unwrap_or_else(|| DEFAULT_HOSPITAL_CSV.to_string());
        let population_csv = lookup("DASHBOARD_POPULATION_CSV")
            .unwrap_or_else(|| DEFAULT_POPULATION_CSV.to_string());

        let join_policy = match lookup("DASHBOARD_JOIN_POLICY") {
            Some(value) => value.parse()?,
            None => JoinPolicy::default(),
        };

        Ok(Self {
            // Absolute file paths win over the data directory
            hospital_csv: data_dir.join(hospital_csv),
            population_csv: data_dir.join(population_csv),
            join_policy,
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_working_directory() {
        let config = DashboardConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.hospital_csv, PathBuf::from(".").join(DEFAULT_HOSPITAL_CSV));
        assert_eq!(config.population_csv, PathBuf::from(".").join(DEFAULT_POPULATION_CSV));
        assert_eq!(config.join_policy, JoinPolicy::WarnAndZeroFill);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn data_dir_and_file_names_combine() {
        let config = DashboardConfig::from_lookup(lookup_from(&[
            ("DASHBOARD_DATA_DIR", "/srv/data"),
            ("DASHBOARD_HOSPITAL_CSV", "hospitals.csv"),
            ("DASHBOARD_JOIN_POLICY", "FAIL"),
        ]))
        .unwrap();
        assert_eq!(config.hospital_csv, PathBuf::from("/srv/data/hospitals.csv"));
        assert_eq!(
            config.population_csv,
            PathBuf::from("/srv/data").join(DEFAULT_POPULATION_CSV)
        );
        assert_eq!(config.join_policy, JoinPolicy::FailFast);
    }

    #[test]
    fn unknown_join_policy_is_rejected() {
        let err = DashboardConfig::from_lookup(lookup_from(&[("DASHBOARD_JOIN_POLICY", "inner")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidJoinPolicy("inner".to_string()));
    }
}
