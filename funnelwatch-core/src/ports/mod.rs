// funnelwatch-core/src/ports/mod.rs

pub mod delivery;
pub mod source;
pub mod store;

pub use delivery::Delivery;
pub use source::{DailyMetrics, MetricSource};
pub use store::SnapshotStore;
