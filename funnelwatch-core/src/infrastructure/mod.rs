// funnelwatch-core/src/infrastructure/mod.rs

pub mod config;
pub mod delivery;
pub mod error;
pub mod fs;
pub mod report;
pub mod source;
pub mod store;

pub use config::load_project_config;
pub use delivery::OutboxDelivery;
pub use report::JinjaRenderer;
pub use source::JsonExportSource;
pub use store::FsSnapshotStore;
