// funnelwatch-core/src/application/status.rs

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::funnel::snapshot::MetricCategory;
use crate::error::FunnelError;
use crate::ports::store::SnapshotStore;

/// What the store holds for one date partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionStatus {
    pub date: NaiveDate,
    pub categories: Vec<MetricCategory>,
}

impl PartitionStatus {
    /// Only complete partitions take part in aggregation.
    pub fn is_complete(&self) -> bool {
        MetricCategory::ALL
            .iter()
            .all(|c| self.categories.contains(c))
    }

    pub fn missing_categories(&self) -> Vec<MetricCategory> {
        MetricCategory::ALL
            .into_iter()
            .filter(|c| !self.categories.contains(c))
            .collect()
    }
}

pub fn store_status(store: &dyn SnapshotStore) -> Result<Vec<PartitionStatus>, FunnelError> {
    store
        .list_partitions()?
        .into_iter()
        .map(|date| {
            let mut categories = Vec::new();
            for category in MetricCategory::ALL {
                if store.contains(date, category)? {
                    categories.push(category);
                }
            }
            Ok(PartitionStatus { date, categories })
        })
        .collect()
}
