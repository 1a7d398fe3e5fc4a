// funnelwatch-core/src/application/report.rs
//
// Weekly narrative: the aggregated funnel rendered as markdown, written next to its JSON.

use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::application::ports::TemplateEngine;
use crate::domain::funnel::aggregated::AggregatedFunnel;
use crate::domain::project::configuration::ReportConfig;
use crate::error::FunnelError;
use crate::infrastructure::fs::{atomic_write, write_json};

pub const FUNNEL_JSON: &str = "funnel.json";
pub const SUMMARY_MD: &str = "summary.md";

pub const SUMMARY_TEMPLATE: &str = r#"# Funnel summary {{ funnel.window_start }} to {{ funnel.window_end }}

- Coverage: {{ funnel.days_covered }}/{{ funnel.window_days }} days
- Sessions ({{ funnel.session_stage }}): {{ funnel.total_sessions }}
- Conversions: {{ funnel.total_conversions }} ({{ funnel.conversion_rate | percent }})
{%- if funnel.previous_window %}
{%- set prev = funnel.previous_window %}
- Previous window {{ prev.window_start }} to {{ prev.window_end }}: {{ prev.total_sessions }} sessions, {{ prev.total_conversions }} conversions ({{ prev.days_covered }}/{{ funnel.window_days }} days)
- Sessions change: {% if prev.sessions_delta > 0 %}+{% endif %}{{ prev.sessions_delta }}{% if prev.sessions_change is number %} ({{ prev.sessions_change | percent }}){% endif %}, {{ prev.trend }}
- Conversions change: {% if prev.conversions_delta > 0 %}+{% endif %}{{ prev.conversions_delta }}
{%- endif %}
{%- if funnel.biggest_drop_off %}
- Biggest drop-off: {{ funnel.biggest_drop_off.from_stage }} -> {{ funnel.biggest_drop_off.to_stage }} ({{ funnel.biggest_drop_off.drop_off_rate | percent }})
{%- endif %}

## Funnel

| Stage | Count | Drop-off |
|---|---:|---:|
{%- for row in stage_rows %}
| {{ row.name | cell }} | {{ row.count }} | {% if row.drop_off is number %}{{ row.drop_off | percent }}{% else %}-{% endif %} |
{%- endfor %}

## Conversions

| Goal | Count |
|---|---:|
{%- for goal in funnel.goals %}
| {{ goal.name | cell }} | {{ goal.count }} |
{%- endfor %}

## Top channels

| Channel | Sessions | Share |
|---|---:|---:|
{%- for channel in channels %}
| {{ channel.name | cell }} | {{ channel.count }} | {{ channel.share | percent }} |
{%- endfor %}

## Top pages

| Page | Views |
|---|---:|
{%- for page in pages %}
| {{ page.name | cell }} | {{ page.count }} |
{%- endfor %}

## Benchmarks

- Conversion rate band: {{ funnel.benchmarks.conversion_rate_band[0] | percent }} - {{ funnel.benchmarks.conversion_rate_band[1] | percent }}
- Standing: {{ funnel.benchmarks.conversion_rate_standing or "not assessed (no sessions)" }}
{%- for high in funnel.benchmarks.high_drop_offs %}
- High drop-off {{ high.from_stage }} -> {{ high.to_stage }}: {{ high.drop_off_rate | percent }} (threshold {{ high.threshold | percent }})
{%- endfor %}
{% if warnings %}
## Warnings
{% for warning in warnings %}
- {{ warning }}
{%- endfor %}
{% endif %}"#;

#[derive(Serialize)]
struct StageRow<'a> {
    name: &'a str,
    count: u64,
    drop_off: Option<f64>,
}

#[derive(Serialize)]
struct RankedRow<'a> {
    name: &'a str,
    count: u64,
    share: f64,
}

/// Renders the markdown summary of an aggregated funnel.
pub fn render_summary(
    engine: &dyn TemplateEngine,
    funnel: &AggregatedFunnel,
    config: &ReportConfig,
) -> Result<String, FunnelError> {
    let stage_rows: Vec<StageRow<'_>> = funnel
        .stages
        .iter()
        .enumerate()
        .map(|(i, stage)| StageRow {
            name: &stage.name,
            count: stage.count,
            drop_off: i
                .checked_sub(1)
                .and_then(|prev| funnel.drop_offs.get(prev))
                .and_then(|d| d.drop_off_rate),
        })
        .collect();

    let channel_total: u64 = funnel.traffic_sources.values().sum();
    let channels = ranked(funnel.top_traffic_sources(config.top_channels), channel_total);
    let page_total: u64 = funnel.pages.values().sum();
    let pages = ranked(funnel.top_pages(config.top_pages), page_total);

    let warnings: Vec<String> = funnel.warnings.iter().map(ToString::to_string).collect();

    let context = json!({
        "funnel": funnel,
        "stage_rows": stage_rows,
        "channels": channels,
        "pages": pages,
        "warnings": warnings,
    });

    engine.render(SUMMARY_TEMPLATE, &context)
}

fn ranked(entries: Vec<(&str, u64)>, total: u64) -> Vec<RankedRow<'_>> {
    entries
        .into_iter()
        .map(|(name, count)| RankedRow {
            name,
            count,
            share: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            },
        })
        .collect()
}

/// One-line subject for delivery.
pub fn summary_subject(funnel: &AggregatedFunnel) -> String {
    format!(
        "Funnel {} to {}: {} conversions ({:.2}%)",
        funnel.window_start,
        funnel.window_end,
        funnel.total_conversions,
        funnel.conversion_rate * 100.0
    )
}

/// Writes `<reports_dir>/<window_end>/funnel.json` and `summary.md`; returns the directory.
#[instrument(skip(funnel, summary))]
pub fn write_report(
    reports_dir: &Path,
    funnel: &AggregatedFunnel,
    summary: &str,
) -> Result<PathBuf, FunnelError> {
    let dir = reports_dir.join(funnel.window_end.format("%Y-%m-%d").to_string());
    write_json(dir.join(FUNNEL_JSON), funnel)?;
    atomic_write(dir.join(SUMMARY_MD), summary)?;
    info!(path = ?dir, "Report written");
    Ok(dir)
}
