// funnelwatch-core/src/infrastructure/config/project.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::project::configuration::ProjectConfig;
use crate::infrastructure::error::InfrastructureError;

const CONFIG_CANDIDATES: [&str; 2] = ["funnelwatch.yaml", "funnelwatch.yml"];

pub const ENV_DATA_PATH: &str = "FUNNELWATCH_DATA_PATH";
pub const ENV_EXPORT_PATH: &str = "FUNNELWATCH_EXPORT_PATH";
pub const ENV_REPORTS_PATH: &str = "FUNNELWATCH_REPORTS_PATH";

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Discover the project file
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    // 2. Parse + validate
    let content = fs::read_to_string(&config_path)?;
    let mut config: ProjectConfig = serde_yaml::from_str(&content)?;
    config.validate()?;

    // 3. Stage/goal vocabulary must build a funnel definition
    config
        .funnel
        .definition()
        .map_err(|e| InfrastructureError::ConfigError(e.to_string()))?;

    // 4. Environment overrides (FUNNELWATCH_DATA_PATH=/mnt/snapshots funnelwatch analyze)
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CONFIG_CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "{} (checked: {:?})",
        root.display(),
        CONFIG_CANDIDATES
    )))
}

fn apply_env_overrides<F>(config: &mut ProjectConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup(ENV_DATA_PATH) {
        info!(old = ?config.data_path, new = ?val, "Overriding data path via ENV");
        config.data_path = val;
    }
    if let Some(val) = lookup(ENV_EXPORT_PATH) {
        info!(old = ?config.export_path, new = ?val, "Overriding export path via ENV");
        config.export_path = val;
    }
    if let Some(val) = lookup(ENV_REPORTS_PATH) {
        info!(old = ?config.reports_path, new = ?val, "Overriding reports path via ENV");
        config.reports_path = val;
    }
}
