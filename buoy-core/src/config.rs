use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// One monitored (name, URL) pair. The name keys the hash store, so it must
/// be unique across the target list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Target {
    pub name: String,
    pub url: String,
}

/// Full configuration for a monitoring run. Targets are checked in declared
/// order; the set is fixed for the lifetime of the run.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    #[serde(default = "default_report_file")]
    pub report_file: PathBuf,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Pause after each target in seconds, regardless of outcome.
    #[serde(default = "default_pause")]
    pub pause_secs: u64,

    #[serde(default)]
    pub targets: Vec<Target>,
}

fn default_state_file() -> PathBuf {
    PathBuf::from("url_hashes.json")
}

fn default_report_file() -> PathBuf {
    PathBuf::from("monitoring_report.xml")
}

fn default_request_timeout() -> u64 {
    15
}

fn default_pause() -> u64 {
    1
}

impl MonitorConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: MonitorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.targets.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one [[targets]] entry is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            if target.name.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "target names must not be empty".to_string(),
                ));
            }
            if !seen.insert(target.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate target name '{}'",
                    target.name
                )));
            }
            Url::parse(&target.url).map_err(|e| {
                ConfigError::Invalid(format!(
                    "target '{}' has an invalid URL '{}': {}",
                    target.name, target.url, e
                ))
            })?;
        }

        Ok(())
    }
}
