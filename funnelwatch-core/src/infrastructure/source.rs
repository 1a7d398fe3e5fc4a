// funnelwatch-core/src/infrastructure/source.rs
//
// Metric source backed by daily analytics exports dropped on disk:
// <export-dir>/<YYYY-MM-DD>.json
//
// {
//   "date": "2025-11-05",
//   "stages": [{ "name": "Visit", "count": 34 }, ...],
//   "goals": { "FormSubmission": 6, "Purchase": "1" },
//   "traffic_sources": [{ "channel": "Organic Search", "sessions": 20 }],
//   "pages": [{ "path": "/", "views": 50 }]
// }
//
// Providers report counts as numbers or numeric strings; both are accepted here and
// nowhere else. Anything that is not a non-negative integer makes the day unavailable.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, instrument};

use crate::domain::error::DomainError;
use crate::domain::funnel::model::{ConversionGoal, Stage};
use crate::domain::funnel::snapshot::Counters;
use crate::error::FunnelError;
use crate::ports::source::{DailyMetrics, MetricSource};

pub struct JsonExportSource {
    export_dir: PathBuf,
}

impl JsonExportSource {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    pub fn export_path(&self, date: NaiveDate) -> PathBuf {
        self.export_dir
            .join(format!("{}.json", date.format("%Y-%m-%d")))
    }
}

#[async_trait]
impl MetricSource for JsonExportSource {
    #[instrument(skip(self))]
    async fn fetch_day(&self, date: NaiveDate) -> Result<DailyMetrics, FunnelError> {
        let path = self.export_path(date);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| unavailable(date, format!("cannot read {}: {}", path.display(), e)))?;

        let raw: Value = serde_json::from_str(&content)
            .map_err(|e| unavailable(date, format!("{} is not valid JSON: {}", path.display(), e)))?;

        let metrics = parse_export(date, &raw)?;
        info!(
            stages = metrics.stages.len(),
            goals = metrics.goals.len(),
            channels = metrics.traffic_sources.len(),
            pages = metrics.pages.len(),
            "Export loaded"
        );
        Ok(metrics)
    }
}

fn unavailable(date: NaiveDate, reason: String) -> FunnelError {
    DomainError::SourceUnavailable { date, reason }.into()
}

/// Converts a loosely typed export into typed counters.
pub fn parse_export(date: NaiveDate, raw: &Value) -> Result<DailyMetrics, FunnelError> {
    let root = raw
        .as_object()
        .ok_or_else(|| unavailable(date, "export root must be a JSON object".to_string()))?;

    if let Some(declared) = root.get("date") {
        let declared = declared.as_str().unwrap_or_default();
        if NaiveDate::parse_from_str(declared, "%Y-%m-%d").ok() != Some(date) {
            return Err(unavailable(
                date,
                format!("export is dated '{}', not {}", declared, date),
            ));
        }
    }

    let stage_rows = root
        .get("stages")
        .ok_or_else(|| unavailable(date, "export has no 'stages' section".to_string()))?;
    let stages = rows(date, "stages", stage_rows, "name", "count")?
        .into_iter()
        .map(|(name, count)| Stage::new(name, count))
        .collect();

    let goals = match root.get("goals") {
        Some(section) => named_counts(date, "goals", section)?
            .into_iter()
            .map(|(name, count)| ConversionGoal::new(name, count))
            .collect(),
        None => Vec::new(),
    };

    let traffic_sources = match root.get("traffic_sources") {
        Some(section) => summed(rows(date, "traffic_sources", section, "channel", "sessions")?),
        None => Counters::new(),
    };

    let pages = match root.get("pages") {
        Some(section) => summed(rows(date, "pages", section, "path", "views")?),
        None => Counters::new(),
    };

    Ok(DailyMetrics {
        stages,
        goals,
        traffic_sources,
        pages,
    })
}

/// `[{ <key>: "...", <value>: n }, ...]` in source order.
fn rows(
    date: NaiveDate,
    section: &str,
    value: &Value,
    key_field: &str,
    count_field: &str,
) -> Result<Vec<(String, u64)>, FunnelError> {
    let items = value
        .as_array()
        .ok_or_else(|| unavailable(date, format!("'{}' must be a list", section)))?;

    items
        .iter()
        .map(|item| {
            let key = item
                .get(key_field)
                .and_then(Value::as_str)
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    unavailable(date, format!("'{}' row without '{}'", section, key_field))
                })?;
            let n = item
                .get(count_field)
                .ok_or_else(|| {
                    unavailable(
                        date,
                        format!("'{}' row '{}' has no '{}'", section, key, count_field),
                    )
                })
                .and_then(|v| count(date, section, key, v))?;
            Ok((key.to_string(), n))
        })
        .collect()
}

/// `{ "<name>": n, ... }`
fn named_counts(
    date: NaiveDate,
    section: &str,
    value: &Value,
) -> Result<Vec<(String, u64)>, FunnelError> {
    let map = value
        .as_object()
        .ok_or_else(|| unavailable(date, format!("'{}' must be an object", section)))?;
    map.iter()
        .map(|(name, v)| Ok((name.clone(), count(date, section, name, v)?)))
        .collect()
}

fn count(date: NaiveDate, section: &str, name: &str, value: &Value) -> Result<u64, FunnelError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        unavailable(
            date,
            format!(
                "'{}' count for '{}' is not a non-negative integer: {}",
                section, name, value
            ),
        )
    })
}

fn summed(rows: Vec<(String, u64)>) -> Counters {
    let mut counters = Counters::new();
    for (key, count) in rows {
        let slot = counters.entry(key).or_insert(0);
        *slot = slot.saturating_add(count);
    }
    counters
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;
    use tempfile::tempdir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn is_unavailable(res: &Result<DailyMetrics, FunnelError>) -> bool {
        matches!(
            res,
            Err(FunnelError::Domain(DomainError::SourceUnavailable { .. }))
        )
    }

    #[test]
    fn test_parses_loose_counts() -> Result<()> {
        let raw = json!({
            "date": "2025-11-05",
            "stages": [
                { "name": "Visit", "count": 34 },
                { "name": "ContentView", "count": "39" }
            ],
            "goals": { "FormSubmission": 6, "Purchase": "1" },
            "traffic_sources": [
                { "channel": "Direct", "sessions": 3 },
                { "channel": "Organic Search", "sessions": 20 },
                { "channel": "Direct", "sessions": 2 }
            ],
            "pages": [{ "path": "/", "views": 50 }]
        });

        let metrics = parse_export(date("2025-11-05"), &raw)?;

        assert_eq!(
            metrics.stages,
            vec![Stage::new("Visit", 34), Stage::new("ContentView", 39)]
        );
        assert_eq!(metrics.goals.len(), 2);
        assert_eq!(metrics.traffic_sources.get("Direct"), Some(&5));
        assert_eq!(metrics.pages.get("/"), Some(&50));
        Ok(())
    }

    #[test]
    fn test_rejects_negative_and_fractional_counts() {
        let day = date("2025-11-05");
        let negative = json!({ "stages": [{ "name": "Visit", "count": -1 }] });
        assert!(is_unavailable(&parse_export(day, &negative)));

        let fractional = json!({ "stages": [], "goals": { "Purchase": 1.5 } });
        assert!(is_unavailable(&parse_export(day, &fractional)));
    }

    #[test]
    fn test_rejects_mismatched_date_and_missing_stages() {
        let day = date("2025-11-05");
        let wrong_day = json!({ "date": "2025-11-06", "stages": [] });
        assert!(is_unavailable(&parse_export(day, &wrong_day)));

        let no_stages = json!({ "goals": {} });
        assert!(is_unavailable(&parse_export(day, &no_stages)));
    }

    #[test]
    fn test_optional_sections_default_to_empty() -> Result<()> {
        let metrics = parse_export(date("2025-11-05"), &json!({ "stages": [] }))?;
        assert_eq!(metrics, DailyMetrics::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_export_is_source_unavailable() -> Result<()> {
        let dir = tempdir()?;
        let source = JsonExportSource::new(dir.path());
        let res = source.fetch_day(date("2025-11-10")).await;
        assert!(is_unavailable(&res));
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_day_reads_export_file() -> Result<()> {
        let dir = tempdir()?;
        let source = JsonExportSource::new(dir.path());
        std::fs::write(
            source.export_path(date("2025-11-09")),
            r#"{ "stages": [{ "name": "Visit", "count": 12 }] }"#,
        )?;

        let metrics = source.fetch_day(date("2025-11-09")).await?;
        assert_eq!(metrics.stages, vec![Stage::new("Visit", 12)]);
        Ok(())
    }
}
