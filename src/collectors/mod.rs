pub mod databases;
pub mod environment;
pub mod projects;
pub mod resources;

use crate::config::Config;
use databases::DatabaseSummary;
use environment::EnvHostFacts;
use serde::Serialize;
use std::collections::BTreeMap;
use sysinfo::{System, SystemExt};

/// Everything one page load shows, gathered fresh per request.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub system_info: Vec<(String, String)>,
    pub project_folders: Vec<String>,
    pub databases: BTreeMap<String, DatabaseSummary>,
    pub loaded_extensions: Vec<String>,
}

pub async fn collect_dashboard(cfg: &Config) -> DashboardData {
    let php = environment::PhpCli::new(&cfg.php_binary);
    let env_info = environment::read_environment_info(&EnvHostFacts, &php);

    let mut system = System::new_all();
    let resources = resources::sample_resources(&mut system, &cfg.disk_path);

    let project_folders =
        projects::list_project_folders(&cfg.projects_root, &cfg.excluded_folder_set());
    let databases = databases::collect_databases(&cfg.database).await;

    // Resource figures are appended after the environment facts; the
    // combined order is what the page displays.
    let mut system_info = env_info.entries;
    system_info.push((
        "Memory Usage".to_string(),
        format!("{:.2} MB", resources.memory_usage_mb),
    ));
    system_info.push((
        "Peak Memory".to_string(),
        format!("{:.2} MB", resources.peak_memory_mb),
    ));
    system_info.push((
        "CPU Load".to_string(),
        resources.cpu_load.display_values().join(", "),
    ));
    system_info.push((
        "Disk Free Space".to_string(),
        format!("{:.2} GB", resources.disk_free_gb),
    ));
    system_info.push((
        "Disk Total Space".to_string(),
        format!("{:.2} GB", resources.disk_total_gb),
    ));

    let mut loaded_extensions = env_info.extensions;
    loaded_extensions.sort();

    DashboardData {
        system_info,
        project_folders,
        databases,
        loaded_extensions,
    }
}

/// Display values are rounded to exactly two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_truncates_to_two_decimals() {
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round2(12.344), 12.34);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn round2_handles_values_near_the_boundary() {
        assert_eq!(round2(1.004), 1.0);
        assert_eq!(round2(1.006), 1.01);
    }
}
