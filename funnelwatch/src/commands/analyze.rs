// funnelwatch/src/commands/analyze.rs
//
// USE CASE: Aggregate a trailing window, write funnel.json + summary.md, optionally deliver.

use chrono::NaiveDate;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use std::path::PathBuf;

use funnelwatch_core::application::{
    Aggregator, render_summary, summary_subject, write_report,
};
use funnelwatch_core::domain::funnel::{AggregatedFunnel, RateStanding, Trend};
use funnelwatch_core::domain::project::ReportConfig;
use funnelwatch_core::infrastructure::{
    FsSnapshotStore, JinjaRenderer, OutboxDelivery, load_project_config,
};
use funnelwatch_core::ports::Delivery;

use crate::cli::OutputFormat;

pub fn execute(
    project_dir: PathBuf,
    end_date: Option<NaiveDate>,
    days: u32,
    deliver: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let end_date = end_date.unwrap_or_else(super::yesterday);
    // JSON mode keeps stdout machine-readable
    let chatty = format == OutputFormat::Table;
    if chatty {
        println!("📊 Aggregating {} day(s) ending {}...", days, end_date);
    }

    // 1. Config + adapters
    let config = load_project_config(&project_dir)?;
    let definition = config.funnel.definition()?;
    let store = FsSnapshotStore::new(project_dir.join(&config.data_path));

    // 2. Aggregate
    let funnel = Aggregator::new(&store, &definition)
        .with_benchmarks(config.benchmarks.clone())
        .aggregate(end_date, days)?;

    // 3. Render + persist the report
    let renderer = JinjaRenderer::new();
    let summary = render_summary(&renderer, &funnel, &config.report)?;
    let report_dir = write_report(&project_dir.join(&config.reports_path), &funnel, &summary)?;

    // 4. Output
    match format {
        OutputFormat::Json => println!("{}", funnel.to_json()?),
        OutputFormat::Table => print_tables(&funnel, &config.report),
    }

    if chatty {
        println!("📄 Report written to {}", report_dir.display());
    }

    // 5. Delivery
    if deliver {
        let outbox = OutboxDelivery::new(project_dir.join(&config.outbox_path));
        let path = outbox.deliver(end_date, &summary_subject(&funnel), &summary)?;
        if chatty {
            println!("📬 Summary delivered to {}", path.display());
        }
    }

    Ok(())
}

fn print_tables(funnel: &AggregatedFunnel, report: &ReportConfig) {
    println!(
        "\n   Window: {} -> {} ({}/{} days covered)",
        funnel.window_start, funnel.window_end, funnel.days_covered, funnel.window_days
    );

    let mut stages = Table::new();
    stages.load_preset(UTF8_FULL);
    stages.set_header(vec!["Stage", "Count", "Drop-off"]);
    for (i, stage) in funnel.stages.iter().enumerate() {
        let drop_off = i
            .checked_sub(1)
            .and_then(|prev| funnel.drop_offs.get(prev))
            .and_then(|d| d.drop_off_rate)
            .map(|rate| format!("{:.1}%", rate * 100.0))
            .unwrap_or_else(|| "-".to_string());
        stages.add_row(vec![stage.name.clone(), stage.count.to_string(), drop_off]);
    }
    println!("{stages}");

    let mut goals = Table::new();
    goals.load_preset(UTF8_FULL);
    goals.set_header(vec!["Goal", "Conversions"]);
    for goal in &funnel.goals {
        goals.add_row(vec![goal.name.clone(), goal.count.to_string()]);
    }
    println!("{goals}");

    let mut channels = Table::new();
    channels.load_preset(UTF8_FULL);
    channels.set_header(vec!["Channel", "Sessions"]);
    for (name, count) in funnel.top_traffic_sources(report.top_channels) {
        channels.add_row(vec![name.to_string(), count.to_string()]);
    }
    println!("{channels}");

    println!(
        "🎯 {} conversion(s) / {} session(s) = {:.2}%",
        funnel.total_conversions,
        funnel.total_sessions,
        funnel.conversion_rate * 100.0
    );
    if let Some(biggest) = &funnel.biggest_drop_off {
        println!(
            "📉 Biggest drop-off: {} -> {}",
            biggest.from_stage, biggest.to_stage
        );
    }
    if let Some(standing) = funnel.benchmarks.conversion_rate_standing {
        let (min, max) = funnel.benchmarks.conversion_rate_band;
        let standing = match standing {
            RateStanding::Below => "below",
            RateStanding::Within => "within",
            RateStanding::Above => "above",
        };
        println!(
            "📏 Conversion rate is {} the {:.0}%-{:.0}% band",
            standing,
            min * 100.0,
            max * 100.0
        );
    }
    if let Some(previous) = &funnel.previous_window {
        let arrow = match previous.trend {
            Trend::Growing => "📈",
            Trend::Flat => "➡️ ",
            Trend::Declining => "📉",
        };
        println!(
            "{} Sessions {:+} vs {} -> {} ({} session(s), {} conversion(s))",
            arrow,
            previous.sessions_delta,
            previous.window_start,
            previous.window_end,
            previous.total_sessions,
            previous.total_conversions
        );
    }
    // Already logged on stderr; repeated here so the table output is self-contained
    for warning in &funnel.warnings {
        println!("⚠️  {}", warning);
    }
}
