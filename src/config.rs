use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub listen: String,
    #[serde(default = "default_projects_root")]
    pub projects_root: String,
    #[serde(default = "default_disk_path")]
    pub disk_path: String,
    #[serde(default = "default_docs_url")]
    pub docs_url: String,
    #[serde(default = "default_admin_url")]
    pub admin_url: String,
    #[serde(default = "default_php_binary")]
    pub php_binary: String,
    #[serde(default = "default_excluded_folders")]
    pub excluded_folders: Vec<String>,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default = "default_db_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_password_env")]
    pub password_env: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_db_host(),
            port: default_db_port(),
            user: default_db_user(),
            password: String::new(),
            password_env: default_password_env(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    /// The env var named by `password_env` wins over the file value,
    /// so credentials can stay out of the config file.
    pub fn resolved_password(&self) -> String {
        env::var(&self.password_env)
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| self.password.clone())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse YAML in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("config validation error: {0}")]
    Validation(String),
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let path_display = path_ref.display().to_string();
        let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;

        let cfg: Config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path_display,
            source,
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen.trim().is_empty() {
            return Err(ConfigError::Validation("listen is required".to_string()));
        }
        if SocketAddr::from_str(&self.listen).is_err() {
            return Err(ConfigError::Validation(
                "listen must be a valid host:port address".to_string(),
            ));
        }
        if self.projects_root.trim().is_empty() {
            return Err(ConfigError::Validation(
                "projects_root must not be empty".to_string(),
            ));
        }
        if self.disk_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "disk_path must not be empty".to_string(),
            ));
        }
        if self.php_binary.trim().is_empty() {
            return Err(ConfigError::Validation(
                "php_binary must not be empty".to_string(),
            ));
        }
        validate_database(&self.database)?;
        Ok(())
    }

    /// Excluded folder names as a lookup set for the project lister.
    pub fn excluded_folder_set(&self) -> HashSet<String> {
        self.excluded_folders.iter().cloned().collect()
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../config.yaml.example")
    }
}

fn validate_database(cfg: &DatabaseConfig) -> Result<(), ConfigError> {
    if cfg.host.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database.host must not be empty".to_string(),
        ));
    }
    if cfg.port == 0 {
        return Err(ConfigError::Validation(
            "database.port must be in range 1..65535".to_string(),
        ));
    }
    if cfg.user.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database.user must not be empty".to_string(),
        ));
    }
    if cfg.connect_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "database.connect_timeout_ms must be > 0".to_string(),
        ));
    }
    Ok(())
}

fn default_projects_root() -> String {
    ".".to_string()
}

fn default_disk_path() -> String {
    "/".to_string()
}

fn default_docs_url() -> String {
    "https://laragon.org/docs".to_string()
}

fn default_admin_url() -> String {
    "/phpmyadmin".to_string()
}

fn default_php_binary() -> String {
    "php".to_string()
}

fn default_excluded_folders() -> Vec<String> {
    vec![
        ".".to_string(),
        "..".to_string(),
        ".git".to_string(),
        ".svn".to_string(),
        ".htaccess".to_string(),
    ]
}

fn default_db_host() -> String {
    "localhost".to_string()
}

const fn default_db_port() -> u16 {
    3306
}

fn default_db_user() -> String {
    "root".to_string()
}

fn default_password_env() -> String {
    "DEVDASH_DB_PASSWORD".to_string()
}

const fn default_connect_timeout_ms() -> u64 {
    3000
}
