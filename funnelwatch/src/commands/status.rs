// funnelwatch/src/commands/status.rs
//
// USE CASE: Inventory of the snapshot store.

use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use std::path::PathBuf;

use funnelwatch_core::application::store_status;
use funnelwatch_core::infrastructure::{FsSnapshotStore, load_project_config};

pub fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    let config = load_project_config(&project_dir)?;
    let store = FsSnapshotStore::new(project_dir.join(&config.data_path));

    println!("🗂️  Snapshot store: {}", store.root().display());
    let partitions = store_status(&store)?;
    if partitions.is_empty() {
        println!("   No snapshot collected yet. Run 'funnelwatch collect'.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Date", "Categories", "Complete"]);
    for partition in &partitions {
        let categories: Vec<&str> = partition.categories.iter().map(|c| c.as_str()).collect();
        let complete = if partition.is_complete() {
            "✅".to_string()
        } else {
            let missing: Vec<&str> = partition
                .missing_categories()
                .iter()
                .map(|c| c.as_str())
                .collect();
            format!("❌ missing {}", missing.join(", "))
        };
        table.add_row(vec![
            partition.date.to_string(),
            categories.join(", "),
            complete,
        ]);
    }
    println!("{table}");

    let complete = partitions.iter().filter(|p| p.is_complete()).count();
    println!(
        "📊 {} partition(s), {} complete",
        partitions.len(),
        complete
    );
    Ok(())
}
