// funnelwatch-core/src/application/aggregate.rs

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::domain::error::DomainError;
use crate::domain::funnel::aggregated::{AggregatedFunnel, FunnelTotals, WindowComparison};
use crate::domain::funnel::benchmark::BenchmarkConfig;
use crate::domain::funnel::model::FunnelDefinition;
use crate::domain::funnel::snapshot::{MetricCategory, trailing_window};
use crate::error::FunnelError;
use crate::ports::store::SnapshotStore;

pub const DEFAULT_WINDOW_DAYS: u32 = 7;
/// One leap year of daily partitions.
pub const MAX_WINDOW_DAYS: u32 = 366;

/// Rolls stored daily snapshots into one funnel for a trailing window.
pub struct Aggregator<'a> {
    store: &'a dyn SnapshotStore,
    definition: &'a FunnelDefinition,
    benchmarks: BenchmarkConfig,
}

impl<'a> Aggregator<'a> {
    pub fn new(store: &'a dyn SnapshotStore, definition: &'a FunnelDefinition) -> Self {
        Self {
            store,
            definition,
            benchmarks: BenchmarkConfig::default(),
        }
    }

    pub fn with_benchmarks(mut self, benchmarks: BenchmarkConfig) -> Self {
        self.benchmarks = benchmarks;
        self
    }

    /// Aggregates `[end_date - window_days + 1, end_date]`.
    ///
    /// Days without a complete snapshot are skipped and reported as missing, never
    /// zero-filled. Snapshots are only read.
    #[instrument(skip(self))]
    pub fn aggregate(
        &self,
        end_date: NaiveDate,
        window_days: u32,
    ) -> Result<AggregatedFunnel, FunnelError> {
        if window_days == 0 || window_days > MAX_WINDOW_DAYS {
            return Err(DomainError::Configuration(format!(
                "aggregation window must be between 1 and {} days, got {}",
                MAX_WINDOW_DAYS, window_days
            ))
            .into());
        }

        // 1. Window + coverage
        let window = trailing_window(end_date, window_days);
        let covered = self.store.list_available_dates(end_date, window_days)?;

        // 2. Merge (sequential, oldest first)
        let mut totals = FunnelTotals::new();
        for date in &covered {
            for category in MetricCategory::ALL {
                let payload = self.store.read(*date, category)?;
                totals.add(category, &payload);
            }
        }

        // 3. Funnel math, anomaly checks, benchmarks
        let mut funnel = totals.finish(self.definition, &self.benchmarks, &window, &covered)?;

        // 4. Same-length window right before this one
        funnel.previous_window = self.previous_window(&funnel)?;

        for warning in &funnel.warnings {
            warn!("{}", warning);
        }
        info!(
            days_covered = funnel.days_covered,
            window_days = funnel.window_days,
            sessions = funnel.total_sessions,
            conversions = funnel.total_conversions,
            "Window aggregated"
        );
        Ok(funnel)
    }

    /// `None` when no day of the preceding window was collected.
    fn previous_window(
        &self,
        current: &AggregatedFunnel,
    ) -> Result<Option<WindowComparison>, FunnelError> {
        let Some(previous_end) = current.window_start.pred_opt() else {
            return Ok(None);
        };
        let covered = self
            .store
            .list_available_dates(previous_end, current.window_days)?;
        if covered.is_empty() {
            return Ok(None);
        }

        let mut totals = FunnelTotals::new();
        for date in &covered {
            for category in [MetricCategory::Stages, MetricCategory::Goals] {
                totals.add(category, &self.store.read(*date, category)?);
            }
        }
        let (sessions, conversions) = totals.headline(self.definition);
        let window = trailing_window(previous_end, current.window_days);

        Ok(WindowComparison::new(
            current,
            &window,
            covered.len() as u32,
            sessions,
            conversions,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::testing::{MemoryStore, date, definition};
    use crate::domain::funnel::aggregated::Trend;
    use crate::domain::funnel::anomaly::FunnelWarning;
    use anyhow::{Context, Result};

    const GOALS: &[(&str, u64)] = &[("FormSubmission", 1)];
    const CHANNELS: &[(&str, u64)] = &[("Organic Search", 3), ("Direct", 1)];
    const PAGES: &[(&str, u64)] = &[("/", 4)];

    fn seeded_week(skip: &[&str]) -> MemoryStore {
        let store = MemoryStore::default();
        let days = [
            "2025-11-05",
            "2025-11-06",
            "2025-11-07",
            "2025-11-08",
            "2025-11-09",
            "2025-11-10",
            "2025-11-11",
        ];
        for day in days.iter().filter(|d| !skip.contains(d)) {
            store.put_day(
                date(day),
                &[("Visit", 10), ("ContentView", 8), ("Engaged", 4), ("Interaction", 1)],
                GOALS,
                CHANNELS,
                PAGES,
            );
        }
        store
    }

    #[test]
    fn test_full_week() -> Result<()> {
        let store = seeded_week(&[]);
        let def = definition();
        let funnel = Aggregator::new(&store, &def).aggregate(date("2025-11-11"), 7)?;

        assert_eq!(funnel.window_start, date("2025-11-05"));
        assert_eq!(funnel.days_covered, 7);
        assert_eq!(funnel.total_sessions, 70);
        assert_eq!(funnel.total_conversions, 7);
        assert_eq!(funnel.conversion_rate, 0.1);
        assert_eq!(funnel.traffic_sources.get("Organic Search"), Some(&21));
        assert!(funnel.warnings.is_empty());
        assert!(funnel.previous_window.is_none());
        Ok(())
    }

    #[test]
    fn test_previous_week_is_compared() -> Result<()> {
        let store = seeded_week(&[]);
        for day in ["2025-10-30", "2025-11-02"] {
            store.put_day(date(day), &[("Visit", 20)], &[("Purchase", 2)], &[], &[]);
        }
        let def = definition();
        let funnel = Aggregator::new(&store, &def).aggregate(date("2025-11-11"), 7)?;

        let previous = funnel.previous_window.context("previous window")?;
        assert_eq!(previous.window_start, date("2025-10-29"));
        assert_eq!(previous.window_end, date("2025-11-04"));
        assert_eq!(previous.days_covered, 2);
        assert_eq!(previous.total_sessions, 40);
        assert_eq!(previous.total_conversions, 4);
        assert_eq!(previous.sessions_delta, 30);
        assert_eq!(previous.conversions_delta, 3);
        assert_eq!(previous.trend, Trend::Growing);
        // The previous window never leaks into the current totals
        assert_eq!(funnel.total_sessions, 70);
        Ok(())
    }

    #[test]
    fn test_partial_week_reports_missing_dates() -> Result<()> {
        let store = seeded_week(&["2025-11-06", "2025-11-10"]);
        let def = definition();
        let funnel = Aggregator::new(&store, &def).aggregate(date("2025-11-11"), 7)?;

        assert_eq!(funnel.window_days, 7);
        assert_eq!(funnel.days_covered, 5);
        assert_eq!(
            funnel.missing_dates,
            vec![date("2025-11-06"), date("2025-11-10")]
        );
        // Skipped, not zero-filled
        assert_eq!(funnel.total_sessions, 50);
        assert!(funnel.warnings.iter().any(|w| matches!(
            w,
            FunnelWarning::PartialCoverage { missing_dates, .. } if missing_dates.len() == 2
        )));
        Ok(())
    }

    #[test]
    fn test_single_missing_day() -> Result<()> {
        let store = seeded_week(&["2025-11-10"]);
        let def = definition();
        let funnel = Aggregator::new(&store, &def).aggregate(date("2025-11-11"), 7)?;

        assert_eq!(funnel.days_covered, funnel.window_days - 1);
        assert!(store.read(date("2025-11-10"), MetricCategory::Stages).is_err());
        Ok(())
    }

    #[test]
    fn test_aggregation_is_deterministic() -> Result<()> {
        let store = seeded_week(&["2025-11-08"]);
        let def = definition();
        let aggregator = Aggregator::new(&store, &def);

        let first = aggregator.aggregate(date("2025-11-11"), 7)?.to_json()?;
        let second = aggregator.aggregate(date("2025-11-11"), 7)?.to_json()?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_empty_window_is_insufficient_data() {
        let store = MemoryStore::default();
        let def = definition();
        let res = Aggregator::new(&store, &def).aggregate(date("2025-11-11"), 7);
        assert!(matches!(
            res,
            Err(FunnelError::Domain(DomainError::InsufficientData { .. }))
        ));
    }

    #[test]
    fn test_zero_window_is_configuration_error() {
        let store = seeded_week(&[]);
        let def = definition();
        let res = Aggregator::new(&store, &def).aggregate(date("2025-11-11"), 0);
        assert!(matches!(
            res,
            Err(FunnelError::Domain(DomainError::Configuration(_)))
        ));
    }

    #[test]
    fn test_oversized_window_is_configuration_error() -> Result<()> {
        let store = seeded_week(&[]);
        let def = definition();
        let aggregator = Aggregator::new(&store, &def);

        let res = aggregator.aggregate(date("2025-11-11"), MAX_WINDOW_DAYS + 1);
        assert!(matches!(
            res,
            Err(FunnelError::Domain(DomainError::Configuration(_)))
        ));
        assert!(aggregator.aggregate(date("2025-11-11"), u32::MAX).is_err());

        let year = aggregator.aggregate(date("2025-11-11"), MAX_WINDOW_DAYS)?;
        assert_eq!(year.days_covered, 7);
        Ok(())
    }

    #[test]
    fn test_negative_drop_off_passes_through_with_warning() -> Result<()> {
        let store = MemoryStore::default();
        store.put_day(
            date("2025-11-11"),
            &[("Visit", 34), ("ContentView", 39), ("Engaged", 34)],
            &[],
            &[],
            &[],
        );
        let def = definition();
        let funnel = Aggregator::new(&store, &def).aggregate(date("2025-11-11"), 1)?;

        let first = &funnel.drop_offs[0];
        assert!((first.drop_off_rate.unwrap() + 0.147).abs() < 1e-3);
        assert_eq!(funnel.stages[1].count, 39);
        assert!(funnel.warnings.iter().any(|w| matches!(
            w,
            FunnelWarning::NegativeDropOff { stage_pair, .. }
                if stage_pair.0 == "Visit" && stage_pair.1 == "ContentView"
        )));
        Ok(())
    }

    #[test]
    fn test_custom_benchmarks_are_applied() -> Result<()> {
        let store = seeded_week(&[]);
        let def = definition();
        let benchmarks = BenchmarkConfig {
            conversion_rate_min: 0.2,
            conversion_rate_max: 0.3,
            max_drop_off: 0.5,
        };
        let funnel = Aggregator::new(&store, &def)
            .with_benchmarks(benchmarks)
            .aggregate(date("2025-11-11"), 7)?;

        assert_eq!(funnel.benchmarks.conversion_rate_band, (0.2, 0.3));
        // Engaged -> Interaction loses 75%
        assert_eq!(funnel.benchmarks.high_drop_offs.len(), 1);
        Ok(())
    }
}
