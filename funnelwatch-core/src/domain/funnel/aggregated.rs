// funnelwatch-core/src/domain/funnel/aggregated.rs
//
// Window rollup: running totals over daily payloads, then the funnel math on the merged totals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::anomaly::{AnomalyChecks, FunnelWarning};
use super::benchmark::{BenchmarkConfig, BenchmarkReport, biggest_drop_off};
use super::model::{
    ConversionGoal, DropOff, FunnelDefinition, Stage, compute_conversion_rate, drop_offs_between,
};
use super::snapshot::{Counters, MetricCategory};
use crate::domain::error::DomainError;

/// Consolidated funnel for a trailing window. Derived on demand, never a source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedFunnel {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub window_days: u32,
    pub days_covered: u32,
    pub missing_dates: Vec<NaiveDate>,
    pub stages: Vec<Stage>,
    pub goals: Vec<ConversionGoal>,
    pub traffic_sources: Counters,
    pub pages: Counters,
    pub session_stage: String,
    pub total_sessions: u64,
    pub total_conversions: u64,
    pub conversion_rate: f64,
    pub drop_offs: Vec<DropOff>,
    pub biggest_drop_off: Option<DropOff>,
    pub benchmarks: BenchmarkReport,
    pub warnings: Vec<FunnelWarning>,
    /// Same-length window ending the day before `window_start`. `None` when nothing was
    /// collected there.
    pub previous_window: Option<WindowComparison>,
}

impl AggregatedFunnel {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Traffic channels sorted by sessions (desc), then by name.
    pub fn top_traffic_sources(&self, limit: usize) -> Vec<(&str, u64)> {
        top_entries(&self.traffic_sources, limit)
    }

    /// Pages sorted by views (desc), then by path.
    pub fn top_pages(&self, limit: usize) -> Vec<(&str, u64)> {
        top_entries(&self.pages, limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Growing,
    Flat,
    Declining,
}

/// Headline numbers of the preceding window, and how the current one moved against them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowComparison {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub days_covered: u32,
    pub total_sessions: u64,
    pub total_conversions: u64,
    pub sessions_delta: i64,
    pub conversions_delta: i64,
    /// Relative change in sessions. `None` when the previous window had no session.
    pub sessions_change: Option<f64>,
    pub trend: Trend,
}

impl WindowComparison {
    pub fn new(
        current: &AggregatedFunnel,
        window: &[NaiveDate],
        days_covered: u32,
        total_sessions: u64,
        total_conversions: u64,
    ) -> Option<Self> {
        let (window_start, window_end) = (*window.first()?, *window.last()?);
        let sessions_delta = delta(current.total_sessions, total_sessions);
        let sessions_change = (total_sessions > 0)
            .then(|| sessions_delta as f64 / total_sessions as f64);
        let trend = match sessions_delta.signum() {
            1 => Trend::Growing,
            -1 => Trend::Declining,
            _ => Trend::Flat,
        };

        Some(Self {
            window_start,
            window_end,
            days_covered,
            total_sessions,
            total_conversions,
            sessions_delta,
            conversions_delta: delta(current.total_conversions, total_conversions),
            sessions_change,
            trend,
        })
    }
}

fn delta(current: u64, previous: u64) -> i64 {
    let current = i64::try_from(current).unwrap_or(i64::MAX);
    let previous = i64::try_from(previous).unwrap_or(i64::MAX);
    current.saturating_sub(previous)
}

fn top_entries(counters: &Counters, limit: usize) -> Vec<(&str, u64)> {
    let mut entries: Vec<(&str, u64)> = counters.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    // BTreeMap iteration is already name-ordered; the stable sort keeps it on ties.
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(limit);
    entries
}

/// Running sums over the daily payloads of one window.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FunnelTotals {
    stages: Counters,
    goals: Counters,
    traffic_sources: Counters,
    pages: Counters,
}

impl FunnelTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one day's payload; keys that collide are summed.
    pub fn add(&mut self, category: MetricCategory, payload: &Counters) {
        let target = match category {
            MetricCategory::Stages => &mut self.stages,
            MetricCategory::Goals => &mut self.goals,
            MetricCategory::TrafficSources => &mut self.traffic_sources,
            MetricCategory::Pages => &mut self.pages,
        };
        for (name, count) in payload {
            let slot = target.entry(name.clone()).or_insert(0);
            *slot = slot.saturating_add(*count);
        }
    }

    /// Session-stage count and summed declared goals, without the full funnel math.
    pub fn headline(&self, definition: &FunnelDefinition) -> (u64, u64) {
        let sessions = self
            .stages
            .get(definition.session_stage())
            .copied()
            .unwrap_or(0);
        let conversions = definition
            .goals()
            .iter()
            .filter_map(|goal| self.goals.get(goal))
            .fold(0u64, |acc, n| acc.saturating_add(*n));
        (sessions, conversions)
    }

    /// Computes the funnel math on the merged totals and attaches warnings and benchmarks.
    ///
    /// `covered_dates` are the days whose payloads were added; every other day of the
    /// window is reported missing. Zero covered days is `InsufficientData`.
    pub fn finish(
        self,
        definition: &FunnelDefinition,
        benchmarks: &BenchmarkConfig,
        window: &[NaiveDate],
        covered_dates: &[NaiveDate],
    ) -> Result<AggregatedFunnel, DomainError> {
        let (window_start, window_end) = match (window.first(), window.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                return Err(DomainError::Configuration(
                    "aggregation window must span at least one day".to_string(),
                ));
            }
        };

        if covered_dates.is_empty() {
            return Err(DomainError::InsufficientData {
                window_start,
                window_end,
            });
        }

        let missing_dates: Vec<NaiveDate> = window
            .iter()
            .filter(|d| !covered_dates.contains(d))
            .copied()
            .collect();
        let window_days = window.len() as u32;
        let days_covered = window_days - missing_dates.len() as u32;

        let stages = definition.order_stages(&self.stages)?;
        let goals = definition.order_goals(&self.goals)?;

        let session_stage = definition.session_stage().to_string();
        let total_sessions = self.stages.get(&session_stage).copied().unwrap_or(0);
        let total_conversions = goals.iter().map(|g| g.count).sum::<u64>();
        let conversion_rate = compute_conversion_rate(total_conversions, total_sessions);

        let drop_offs = drop_offs_between(&stages);
        let warnings = AnomalyChecks::validate(
            &drop_offs,
            &session_stage,
            !definition.goals().is_empty(),
            total_sessions,
            total_conversions,
            window_days,
            &missing_dates,
        );
        let benchmarks = benchmarks.assess(conversion_rate, total_sessions, &drop_offs);

        Ok(AggregatedFunnel {
            window_start,
            window_end,
            window_days,
            days_covered,
            missing_dates,
            stages,
            goals,
            traffic_sources: self.traffic_sources,
            pages: self.pages,
            session_stage,
            total_sessions,
            total_conversions,
            conversion_rate,
            biggest_drop_off: biggest_drop_off(&drop_offs),
            drop_offs,
            benchmarks,
            warnings,
            previous_window: None,
        })
    }
}
