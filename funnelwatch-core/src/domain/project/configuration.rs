// src/domain/project/configuration.rs

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::{Validate, ValidationError};

use crate::domain::error::DomainError;
use crate::domain::funnel::benchmark::BenchmarkConfig;
use crate::domain::funnel::model::FunnelDefinition;

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ProjectConfig {
    #[validate(length(min = 1, message = "Project name cannot be empty"))]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,

    /// Root of the date partitions (`<data-path>/<YYYY-MM-DD>/<category>.json`).
    #[serde(rename = "data-path", default = "default_data_path")]
    pub data_path: String,

    /// Where the analytics export files (`<YYYY-MM-DD>.json`) are dropped.
    #[serde(rename = "export-path", default = "default_export_path")]
    pub export_path: String,

    #[serde(rename = "reports-path", default = "default_reports_path")]
    pub reports_path: String,

    #[serde(rename = "outbox-path", default = "default_outbox_path")]
    pub outbox_path: String,

    #[validate(nested)]
    pub funnel: FunnelConfig,

    #[serde(default)]
    #[validate(nested)]
    pub benchmarks: BenchmarkConfig,

    #[serde(default)]
    #[validate(nested)]
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct FunnelConfig {
    /// Journey stages, in funnel order.
    #[validate(length(min = 1, message = "At least one funnel stage is required"))]
    #[validate(custom(function = "validate_unique_names"))]
    pub stages: Vec<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_unique_names"))]
    pub goals: Vec<String>,

    /// Stage counted as "sessions". First stage when omitted.
    #[serde(rename = "session-stage", default)]
    pub session_stage: Option<String>,
}

impl FunnelConfig {
    pub fn definition(&self) -> Result<FunnelDefinition, DomainError> {
        let definition = FunnelDefinition::new(self.stages.clone(), self.goals.clone())?;
        match &self.session_stage {
            Some(stage) => definition.with_session_stage(stage),
            None => Ok(definition),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ReportConfig {
    #[serde(rename = "top-pages", default = "default_top_pages")]
    #[validate(range(min = 1))]
    pub top_pages: usize,

    #[serde(rename = "top-channels", default = "default_top_channels")]
    #[validate(range(min = 1))]
    pub top_channels: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_pages: default_top_pages(),
            top_channels: default_top_channels(),
        }
    }
}

fn validate_unique_names(names: &[String]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    if names.iter().all(|n| seen.insert(n.as_str())) {
        Ok(())
    } else {
        Err(ValidationError::new("duplicate_names"))
    }
}

fn default_version() -> String {
    "0.1.0".to_string()
}
fn default_data_path() -> String {
    "data".to_string()
}
fn default_export_path() -> String {
    "exports".to_string()
}
fn default_reports_path() -> String {
    "reports".to_string()
}
fn default_outbox_path() -> String {
    "outbox".to_string()
}
fn default_top_pages() -> usize {
    20
}
fn default_top_channels() -> usize {
    10
}
