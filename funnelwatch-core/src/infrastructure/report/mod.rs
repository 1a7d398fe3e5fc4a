// funnelwatch-core/src/infrastructure/report/mod.rs

pub mod jinja;

pub use jinja::JinjaRenderer;
