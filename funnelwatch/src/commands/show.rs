// funnelwatch/src/commands/show.rs
//
// USE CASE: Print one stored (date, category) record.

use chrono::NaiveDate;
use std::path::PathBuf;

use funnelwatch_core::domain::funnel::{CategoryRecord, MetricCategory};
use funnelwatch_core::infrastructure::{FsSnapshotStore, load_project_config};
use funnelwatch_core::ports::SnapshotStore;

pub fn execute(project_dir: PathBuf, date: NaiveDate, category: MetricCategory) -> anyhow::Result<()> {
    let config = load_project_config(&project_dir)?;
    let store = FsSnapshotStore::new(project_dir.join(&config.data_path));

    // Absence is fatal here: there is no window to fall back on.
    let metrics = store.read(date, category)?;

    let record = CategoryRecord {
        date,
        category,
        metrics,
    };
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
