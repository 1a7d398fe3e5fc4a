// funnelwatch-core/src/domain/funnel/mod.rs

pub mod aggregated;
pub mod anomaly;
pub mod benchmark;
pub mod model;
pub mod snapshot;

pub use aggregated::{AggregatedFunnel, FunnelTotals, Trend, WindowComparison};
pub use anomaly::{AnomalyChecks, FunnelWarning};
pub use benchmark::{BenchmarkConfig, BenchmarkReport, HighDropOff, RateStanding};
pub use model::{
    ConversionGoal, DropOff, FunnelDefinition, Stage, compute_conversion_rate, drop_off_rate,
};
pub use snapshot::{CategoryRecord, Counters, FunnelSnapshot, MetricCategory, trailing_window};
