//! CLI configuration management.

use serde::{Deserialize, Serialize};
use skiff_core::FailurePolicy;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Persistent CLI defaults, overridden by flags and environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Default project for bucket listing.
    pub project_id: Option<String>,
    /// Service account impersonated on every storage call.
    pub service_account: Option<String>,
    #[serde(default = "default_gsutil_path")]
    pub gsutil_path: String,
    #[serde(default = "default_gh_path")]
    pub gh_path: String,
    /// Timeout for each external command.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_gsutil_path() -> String {
    "gsutil".to_string()
}

fn default_gh_path() -> String {
    "gh".to_string()
}

fn default_timeout_seconds() -> u64 {
    3600
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            service_account: None,
            gsutil_path: default_gsutil_path(),
            gh_path: default_gh_path(),
            timeout_seconds: default_timeout_seconds(),
            failure_policy: FailurePolicy::default(),
            output_format: OutputFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

impl CliConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from the default location. An unreadable or
    /// malformed file is logged and replaced by defaults.
    pub fn load_or_default() -> Self {
        match Self::config_path() {
            Ok(path) => Self::load_from_or_default(&path),
            Err(e) => {
                warn!(error = %e, "Could not locate config file, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from_or_default(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable config file, using defaults");
            Self::default()
        })
    }

    /// Load configuration from `path`, falling back to defaults if absent.
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let dirs = directories::ProjectDirs::from("dev", "skiff", "skiff")
            .ok_or("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.yaml"))
    }

    /// Set a configuration value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "project_id" => self.project_id = Some(value.to_string()),
            "service_account" => self.service_account = Some(value.to_string()),
            "gsutil_path" => self.gsutil_path = value.to_string(),
            "gh_path" => self.gh_path = value.to_string(),
            "timeout_seconds" => {
                self.timeout_seconds = value
                    .parse()
                    .map_err(|_| format!("Invalid timeout: {}", value))?;
            }
            "failure_policy" => {
                self.failure_policy = value.parse().map_err(|e| format!("{}", e))?;
            }
            "output_format" => {
                self.output_format = match value {
                    "table" => OutputFormat::Table,
                    "json" => OutputFormat::Json,
                    "yaml" => OutputFormat::Yaml,
                    _ => return Err(format!("Invalid output format: {}", value)),
                };
            }
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }
}
