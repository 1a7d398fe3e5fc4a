// funnelwatch-core/src/domain/project/mod.rs

pub mod configuration;
pub use configuration::{FunnelConfig, ProjectConfig, ReportConfig};
