//! Process-wide summary cache
//! The merged table is built once per set of input files and shared afterwards.

use crate::config::{DashboardConfig, JoinPolicy};
use crate::data::loader::{load_state_summary, LoadError};
use crate::data::processor::StateSummary;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::SystemTime;
use tracing::debug;

/// Identity of one input file: where it is, how big it is, when it changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FileIdentity {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
}

impl FileIdentity {
    fn of(path: &Path) -> Result<Self, LoadError> {
        let not_found = |source| LoadError::FileNotFound {
            path: path.to_path_buf(),
            source,
        };
        let meta = fs::metadata(path).map_err(not_found)?;
        let canonical = fs::canonicalize(path).map_err(not_found)?;
        Ok(Self {
            path: canonical,
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    hospitals: FileIdentity,
    population: FileIdentity,
    policy: JoinPolicy,
}

impl CacheKey {
    fn for_config(config: &DashboardConfig) -> Result<Self, LoadError> {
        Ok(Self {
            hospitals: FileIdentity::of(&config.hospital_csv)?,
            population: FileIdentity::of(&config.population_csv)?,
            policy: config.join_policy,
        })
    }
}

/// Built summaries keyed by input file identity. Failed loads are not stored.
#[derive(Default)]
pub struct SummaryCache {
    entries: Mutex<HashMap<CacheKey, Arc<StateSummary>>>,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by every session of this process.
    pub fn global() -> &'static SummaryCache {
        static INSTANCE: OnceLock<SummaryCache> = OnceLock::new();
        INSTANCE.get_or_init(SummaryCache::new)
    }

    /// Return the summary for the configured files, building it on first use.
    pub fn get_or_load(&self, config: &DashboardConfig) -> Result<Arc<StateSummary>, LoadError> {
        let key = CacheKey::for_config(config)?;

        // Held across the load so one file set is never built twice.
        let mut entries = self.lock();
        if let Some(summary) = entries.get(&key) {
            debug!(path = %key.hospitals.path.display(), "summary cache hit");
            return Ok(Arc::clone(summary));
        }

        debug!(path = %key.hospitals.path.display(), "summary cache miss");
        let summary = Arc::new(load_state_summary(config)?);
        entries.insert(key, Arc::clone(&summary));
        Ok(summary)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<StateSummary>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Shortcut for `SummaryCache::global().get_or_load(config)`.
pub fn get_or_load(config: &DashboardConfig) -> Result<Arc<StateSummary>, LoadError> {
    SummaryCache::global().get_or_load(config)
}
