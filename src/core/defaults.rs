use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;
use crate::{io, paths};

/// Root configuration structure for config.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MigrateConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default = "default_commit_batch_size")]
    pub commit_batch_size: usize,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default = "default_subscription_settle_seconds")]
    pub subscription_settle_seconds: u64,

    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook_template: Option<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            branch: default_branch(),
            commit_batch_size: default_commit_batch_size(),
            polling: PollingConfig::default(),
            subscription_settle_seconds: default_subscription_settle_seconds(),
            request_timeout_seconds: default_request_timeout_seconds(),
            notebook_template: None,
        }
    }
}

/// Fixed-interval polling used while waiting on asynchronous AWS operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_seconds: default_delay_seconds(),
        }
    }
}

impl PollingConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_seconds)
    }
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_commit_batch_size() -> usize {
    100
}

fn default_max_attempts() -> u32 {
    30
}

fn default_delay_seconds() -> u64 {
    5
}

fn default_subscription_settle_seconds() -> u64 {
    10
}

fn default_request_timeout_seconds() -> u64 {
    5
}

/// `defaults` section of config.json; unreadable or invalid files yield the
/// built-in values.
pub fn load_defaults() -> Defaults {
    load_config().defaults
}

pub fn load_config() -> MigrateConfig {
    read_config().ok().flatten().unwrap_or_default()
}

fn read_config() -> crate::Result<Option<MigrateConfig>> {
    let path = paths::config_json()?;
    if !path.exists() {
        return Ok(None);
    }
    let content = io::read_file(&path, "read config.json")?;
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))
}

pub fn save_config(config: &MigrateConfig) -> crate::Result<()> {
    let path = paths::config_json()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .map_err(|e| Error::internal_io(e.to_string(), Some(format!("create {}", dir.display()))))?;
    }
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize config.json".to_string())))?;
    io::write_file_atomic(&path, &content, "write config.json")
}

pub fn config_exists() -> bool {
    paths::config_json().is_ok_and(|p| p.exists())
}

/// Remove config.json. Returns whether a file was deleted.
pub fn reset_config() -> crate::Result<bool> {
    let path = paths::config_json()?;
    match fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::internal_io(e.to_string(), Some(format!("delete {}", path.display())))),
    }
}

pub fn config_path() -> crate::Result<String> {
    Ok(paths::config_json()?.display().to_string())
}

pub fn builtin_defaults() -> Defaults {
    Defaults::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_builtin_values() {
        let config: MigrateConfig =
            serde_json::from_str(r#"{"defaults":{"branch":"dev","polling":{"delaySeconds":1}}}"#)
                .unwrap();
        assert_eq!(config.defaults.branch, "dev");
        assert_eq!(config.defaults.polling.delay_seconds, 1);
        assert_eq!(config.defaults.polling.max_attempts, 30);
        assert_eq!(config.defaults.commit_batch_size, 100);
        assert_eq!(config.defaults.subscription_settle_seconds, 10);
    }

    #[test]
    fn empty_object_is_builtin_defaults() {
        let config: MigrateConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.defaults.branch, "main");
        assert!(config.defaults.notebook_template.is_none());
        assert_eq!(config.defaults.polling.delay(), Duration::from_secs(5));
    }
}
