// funnelwatch-core/src/application/collect.rs

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::domain::funnel::model::FunnelDefinition;
use crate::domain::funnel::snapshot::{Counters, FunnelSnapshot, MetricCategory};
use crate::error::FunnelError;
use crate::ports::source::MetricSource;
use crate::ports::store::SnapshotStore;

/// Collects one calendar day and persists it as four category records.
///
/// The source is queried before anything is written: a failing source leaves the
/// store untouched for that day. Re-collecting a day replaces its records; if that
/// fails halfway the day is left incomplete and drops out of aggregation.
#[instrument(skip(source, store, definition))]
pub async fn collect_day(
    source: &dyn MetricSource,
    store: &dyn SnapshotStore,
    definition: &FunnelDefinition,
    date: NaiveDate,
) -> Result<FunnelSnapshot, FunnelError> {
    // 1. Fetch (only suspension point)
    let metrics = source.fetch_day(date).await.inspect_err(|e| {
        warn!(error = %e, "Collection aborted, nothing written");
    })?;

    // 2. Map onto the funnel vocabulary (unknown names are a configuration error)
    let stages = definition.order_stages(&sum_by_name(
        metrics.stages.iter().map(|s| (s.name.as_str(), s.count)),
    ))?;
    let goals = definition.order_goals(&sum_by_name(
        metrics.goals.iter().map(|g| (g.name.as_str(), g.count)),
    ))?;

    let snapshot = FunnelSnapshot {
        date,
        stages,
        goals,
        traffic_sources: metrics.traffic_sources,
        pages: metrics.pages,
    };

    // 3. Invalidate the previous snapshot of that day. A failure below leaves an
    //    incomplete day, which coverage excludes, never a mix of old and new records.
    for category in MetricCategory::ALL {
        store.remove(date, category)?;
    }

    // 4. Persist, one atomic record per category
    for category in MetricCategory::ALL {
        store.write(date, category, &snapshot.payload(category))?;
    }

    let sessions = snapshot
        .stages
        .iter()
        .find(|s| s.name == definition.session_stage())
        .map(|s| s.count)
        .unwrap_or_default();
    info!(sessions, "Snapshot collected");
    Ok(snapshot)
}

fn sum_by_name<'a, I>(rows: I) -> Counters
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    let mut counters = Counters::new();
    for (name, count) in rows {
        let slot = counters.entry(name.to_string()).or_insert(0);
        *slot = slot.saturating_add(count);
    }
    counters
}
