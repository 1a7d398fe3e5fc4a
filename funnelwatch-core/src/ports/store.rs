// funnelwatch-core/src/ports/store.rs

use chrono::NaiveDate;

use crate::domain::funnel::snapshot::{Counters, MetricCategory, trailing_window};
use crate::error::FunnelError;

/// Durable per-day storage, partitioned by (date, category).
///
/// "Stored with zero counts" and "never collected" are different states: the
/// first reads back as a payload, the second as `DomainError::NotFound`.
pub trait SnapshotStore: Send + Sync {
    /// Persists one category for one day, replacing any previous payload for that key.
    fn write(
        &self,
        date: NaiveDate,
        category: MetricCategory,
        payload: &Counters,
    ) -> Result<(), FunnelError>;

    /// Drops one record. Removing a record that does not exist is not an error.
    fn remove(&self, date: NaiveDate, category: MetricCategory) -> Result<(), FunnelError>;

    fn read(&self, date: NaiveDate, category: MetricCategory) -> Result<Counters, FunnelError>;

    fn contains(&self, date: NaiveDate, category: MetricCategory) -> Result<bool, FunnelError>;

    /// Every date partition present in the store, oldest first.
    fn list_partitions(&self) -> Result<Vec<NaiveDate>, FunnelError>;

    /// Days of the trailing window (inclusive of `end_date`) holding all four categories.
    fn list_available_dates(
        &self,
        end_date: NaiveDate,
        window_days: u32,
    ) -> Result<Vec<NaiveDate>, FunnelError> {
        let mut available = Vec::new();
        for date in trailing_window(end_date, window_days) {
            let mut complete = true;
            for category in MetricCategory::ALL {
                if !self.contains(date, category)? {
                    complete = false;
                    break;
                }
            }
            if complete {
                available.push(date);
            }
        }
        Ok(available)
    }
}
