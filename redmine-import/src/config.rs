//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Config file looked for in the working directory.
const LOCAL_CONFIG_FILE: &str = "redmine-import.toml";

/// Everything one run needs: the Redmine instance and the custom-field ids
/// recognized in column headers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub redmine: RedmineConfig,
    pub custom_fields: CustomFieldsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedmineConfig {
    pub base_url: String,
    pub api_key: String,
    /// Parent for projects whose row carries no parent id.
    pub root_project_id: i64,
    /// Per-request timeout of the HTTP client.
    pub timeout_secs: u64,
}

impl Default for RedmineConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            root_project_id: 3,
            timeout_secs: 30,
        }
    }
}

/// Custom-field id allow-lists; numeric headers outside these are ignored.
///
/// Defaults mirror the deployment the stock template was built for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomFieldsConfig {
    pub projects: Vec<i64>,
    pub issues: Vec<i64>,
}

impl Default for CustomFieldsConfig {
    fn default() -> Self {
        Self {
            projects: vec![43, 44, 38, 45, 39, 35, 36, 40, 41, 42],
            issues: vec![20, 49, 37, 47, 48, 46],
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// Search order: the explicit `path`, then `./redmine-import.toml`,
    /// then `<user config dir>/redmine-import/config.toml`; when no file is
    /// found the defaults apply. The `REDMINE_URL` and `REDMINE_API_KEY`
    /// environment variables override the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::locate(path) {
            Some(file) => {
                log::debug!("loading config from {}", file.display());
                let text = fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read config file: {}", file.display()))?;
                toml::from_str(&text)
                    .with_context(|| format!("Failed to parse config file: {}", file.display()))?
            }
            None => Self::default(),
        };

        if let Ok(url) = std::env::var("REDMINE_URL") {
            config.redmine.base_url = url;
        }
        if let Ok(key) = std::env::var("REDMINE_API_KEY") {
            config.redmine.api_key = key;
        }
        Ok(config)
    }

    fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        let user = dirs::config_dir()?
            .join("redmine-import")
            .join("config.toml");
        user.exists().then_some(user)
    }
}
