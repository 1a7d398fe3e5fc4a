// funnelwatch-core/src/application/testing.rs
//
// In-memory adapters shared by the use-case tests.

#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::domain::error::DomainError;
use crate::domain::funnel::model::FunnelDefinition;
use crate::domain::funnel::snapshot::{Counters, MetricCategory};
use crate::error::FunnelError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::source::{DailyMetrics, MetricSource};
use crate::ports::store::SnapshotStore;

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn counters(pairs: &[(&str, u64)]) -> Counters {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

pub fn definition() -> FunnelDefinition {
    FunnelDefinition::new(
        ["Visit", "ContentView", "Engaged", "Interaction"],
        ["FormSubmission", "Purchase"],
    )
    .unwrap()
}

/// Answers from a fixed table; unknown days are unavailable.
#[derive(Default)]
pub struct FixedSource {
    days: BTreeMap<NaiveDate, DailyMetrics>,
}

impl FixedSource {
    pub fn with_day(mut self, date: NaiveDate, metrics: DailyMetrics) -> Self {
        self.days.insert(date, metrics);
        self
    }
}

#[async_trait]
impl MetricSource for FixedSource {
    async fn fetch_day(&self, date: NaiveDate) -> Result<DailyMetrics, FunnelError> {
        self.days.get(&date).cloned().ok_or_else(|| {
            DomainError::SourceUnavailable {
                date,
                reason: "no fixture for that day".to_string(),
            }
            .into()
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<(NaiveDate, MetricCategory), Counters>>,
}

impl MemoryStore {
    /// Stores the same stage/goal/channel/page payloads for one day.
    pub fn put_day(
        &self,
        date: NaiveDate,
        stages: &[(&str, u64)],
        goals: &[(&str, u64)],
        traffic_sources: &[(&str, u64)],
        pages: &[(&str, u64)],
    ) {
        self.write(date, MetricCategory::Stages, &counters(stages))
            .unwrap();
        self.write(date, MetricCategory::Goals, &counters(goals))
            .unwrap();
        self.write(date, MetricCategory::TrafficSources, &counters(traffic_sources))
            .unwrap();
        self.write(date, MetricCategory::Pages, &counters(pages))
            .unwrap();
    }
}

impl SnapshotStore for MemoryStore {
    fn write(
        &self,
        date: NaiveDate,
        category: MetricCategory,
        payload: &Counters,
    ) -> Result<(), FunnelError> {
        self.records
            .lock()
            .unwrap()
            .insert((date, category), payload.clone());
        Ok(())
    }

    fn remove(&self, date: NaiveDate, category: MetricCategory) -> Result<(), FunnelError> {
        self.records.lock().unwrap().remove(&(date, category));
        Ok(())
    }

    fn read(&self, date: NaiveDate, category: MetricCategory) -> Result<Counters, FunnelError> {
        self.records
            .lock()
            .unwrap()
            .get(&(date, category))
            .cloned()
            .ok_or_else(|| DomainError::NotFound { date, category }.into())
    }

    fn contains(&self, date: NaiveDate, category: MetricCategory) -> Result<bool, FunnelError> {
        Ok(self.records.lock().unwrap().contains_key(&(date, category)))
    }

    fn list_partitions(&self) -> Result<Vec<NaiveDate>, FunnelError> {
        let mut dates: Vec<NaiveDate> = self
            .records
            .lock()
            .unwrap()
            .keys()
            .map(|(date, _)| *date)
            .collect();
        dates.dedup();
        Ok(dates)
    }
}

/// Wraps a `MemoryStore`; every write of `fail_on` hits a full disk.
pub struct FailingStore {
    pub inner: MemoryStore,
    fail_on: MetricCategory,
}

impl FailingStore {
    pub fn new(inner: MemoryStore, fail_on: MetricCategory) -> Self {
        Self { inner, fail_on }
    }
}

impl SnapshotStore for FailingStore {
    fn write(
        &self,
        date: NaiveDate,
        category: MetricCategory,
        payload: &Counters,
    ) -> Result<(), FunnelError> {
        if category == self.fail_on {
            return Err(InfrastructureError::Io(std::io::Error::other("disk full")).into());
        }
        self.inner.write(date, category, payload)
    }

    fn remove(&self, date: NaiveDate, category: MetricCategory) -> Result<(), FunnelError> {
        self.inner.remove(date, category)
    }

    fn read(&self, date: NaiveDate, category: MetricCategory) -> Result<Counters, FunnelError> {
        self.inner.read(date, category)
    }

    fn contains(&self, date: NaiveDate, category: MetricCategory) -> Result<bool, FunnelError> {
        self.inner.contains(date, category)
    }

    fn list_partitions(&self) -> Result<Vec<NaiveDate>, FunnelError> {
        self.inner.list_partitions()
    }
}
