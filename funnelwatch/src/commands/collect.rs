// funnelwatch/src/commands/collect.rs
//
// USE CASE: Collect one day of analytics into the snapshot store.

use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::debug;

use funnelwatch_core::application::collect_day;
use funnelwatch_core::infrastructure::{FsSnapshotStore, JsonExportSource, load_project_config};

pub async fn execute(project_dir: PathBuf, date: Option<NaiveDate>) -> anyhow::Result<()> {
    let date = date.unwrap_or_else(super::yesterday);
    println!("📥 Collecting {}...", date);

    // 1. Config + funnel vocabulary
    let config = load_project_config(&project_dir)?;
    let definition = config.funnel.definition()?;
    println!("   Project: {} (v{})", config.name, config.version);

    // 2. Adapters
    let source = JsonExportSource::new(project_dir.join(&config.export_path));
    let store = FsSnapshotStore::new(project_dir.join(&config.data_path));
    debug!(exports = %config.export_path, data = %config.data_path, "Adapters ready");

    // 3. Fetch + persist
    let snapshot = collect_day(&source, &store, &definition, date).await?;

    for stage in &snapshot.stages {
        println!("   ➜ {:<20} {}", stage.name, stage.count);
    }
    let conversions: u64 = snapshot.goals.iter().map(|g| g.count).sum();
    println!("   🎯 Conversions: {}", conversions);
    println!(
        "✨ Snapshot stored in {}",
        store.partition_dir(date).display()
    );
    Ok(())
}
