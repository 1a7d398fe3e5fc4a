// funnelwatch-core/src/application/mod.rs

pub mod aggregate;
pub mod collect;
pub mod ports;
pub mod report;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;

// --- RE-EXPORTS (FACADE PATTERN) ---
// `use funnelwatch_core::application::{collect_day, Aggregator};`

pub use aggregate::{Aggregator, DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};
pub use collect::collect_day;
pub use report::{render_summary, summary_subject, write_report};
pub use status::{PartitionStatus, store_status};
