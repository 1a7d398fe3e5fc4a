// funnelwatch-core/src/ports/source.rs

// What the pipeline needs from the analytics platform, without knowing which platform it is.
// Adapters convert provider payloads into these typed records; the core never sees raw JSON.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::funnel::model::{ConversionGoal, Stage};
use crate::domain::funnel::snapshot::Counters;
use crate::error::FunnelError;

/// Raw counters for one calendar day, as reported by the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyMetrics {
    pub stages: Vec<Stage>,
    pub goals: Vec<ConversionGoal>,
    pub traffic_sources: Counters,
    pub pages: Counters,
}

#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Counters for a single day. A failure is `SourceUnavailable`; adapters never
    /// answer with zero-filled data instead.
    async fn fetch_day(&self, date: NaiveDate) -> Result<DailyMetrics, FunnelError>;
}
