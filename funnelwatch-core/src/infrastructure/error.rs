// funnelwatch-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(funnelwatch::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- SNAPSHOTS / EXPORTS ---
    #[error("JSON Error: {0}")]
    #[diagnostic(
        code(funnelwatch::infra::json),
        help("A snapshot or export file is not valid JSON.")
    )]
    Json(#[from] serde_json::Error),

    #[error("Corrupted snapshot at '{path}': {reason}")]
    #[diagnostic(
        code(funnelwatch::infra::corrupted_snapshot),
        help("Re-collect that day to overwrite the record.")
    )]
    CorruptedSnapshot { path: String, reason: String },

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(funnelwatch::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(funnelwatch::infra::config_invalid))]
    ConfigInvalid(#[from] validator::ValidationErrors),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(funnelwatch::infra::config_missing))]
    ConfigNotFound(String),

    // --- TEMPLATING ---
    #[error("Template Rendering Error: {0}")]
    #[diagnostic(
        code(funnelwatch::infra::template),
        help("Check the report template syntax ({{ ... }}).")
    )]
    TemplateError(#[from] minijinja::Error),
}
