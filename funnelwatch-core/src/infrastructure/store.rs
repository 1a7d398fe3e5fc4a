// funnelwatch-core/src/infrastructure/store.rs
//
// Filesystem snapshot store: <root>/<YYYY-MM-DD>/<category>.json

use chrono::NaiveDate;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::domain::error::DomainError;
use crate::domain::funnel::snapshot::{CategoryRecord, Counters, MetricCategory};
use crate::error::FunnelError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::write_json;
use crate::ports::store::SnapshotStore;

const DATE_FORMAT: &str = "%Y-%m-%d";

static PARTITION_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").ok());

pub struct FsSnapshotStore {
    root: PathBuf,
}

impl FsSnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn partition_dir(&self, date: NaiveDate) -> PathBuf {
        self.root.join(date.format(DATE_FORMAT).to_string())
    }

    pub fn record_path(&self, date: NaiveDate, category: MetricCategory) -> PathBuf {
        self.partition_dir(date)
            .join(format!("{}.json", category.as_str()))
    }
}

impl SnapshotStore for FsSnapshotStore {
    #[instrument(skip(self, payload), fields(metrics = payload.len()))]
    fn write(
        &self,
        date: NaiveDate,
        category: MetricCategory,
        payload: &Counters,
    ) -> Result<(), FunnelError> {
        let record = CategoryRecord {
            date,
            category,
            metrics: payload.clone(),
        };
        let path = self.record_path(date, category);
        write_json(&path, &record)?;
        debug!(path = ?path, "Snapshot record written");
        Ok(())
    }

    fn remove(&self, date: NaiveDate, category: MetricCategory) -> Result<(), FunnelError> {
        let path = self.record_path(date, category);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = ?path, "Snapshot record removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn read(&self, date: NaiveDate, category: MetricCategory) -> Result<Counters, FunnelError> {
        let path = self.record_path(date, category);
        if !path.is_file() {
            return Err(DomainError::NotFound { date, category }.into());
        }

        let content = fs::read_to_string(&path)?;
        let record: CategoryRecord = serde_json::from_str(&content).map_err(|e| {
            InfrastructureError::CorruptedSnapshot {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        // The file name is the key; a record claiming another key was misplaced.
        if record.date != date || record.category != category {
            return Err(InfrastructureError::CorruptedSnapshot {
                path: path.display().to_string(),
                reason: format!(
                    "record is keyed ({}, {}), expected ({}, {})",
                    record.date, record.category, date, category
                ),
            }
            .into());
        }

        Ok(record.metrics)
    }

    fn contains(&self, date: NaiveDate, category: MetricCategory) -> Result<bool, FunnelError> {
        Ok(self.record_path(date, category).is_file())
    }

    fn list_partitions(&self) -> Result<Vec<NaiveDate>, FunnelError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut dates = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                InfrastructureError::Io(std::io::Error::other(e.to_string()))
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            let looks_like_date = PARTITION_NAME
                .as_ref()
                .is_some_and(|re| re.is_match(&name));
            if !looks_like_date {
                continue;
            }
            if let Ok(date) = NaiveDate::parse_from_str(&name, DATE_FORMAT) {
                dates.push(date);
            }
        }
        dates.sort();
        Ok(dates)
    }
}
