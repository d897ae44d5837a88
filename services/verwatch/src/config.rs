//! Configuration types for the verwatch service

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub notice: NoticeConfig,
    #[serde(default)]
    pub reload: ReloadConfig,
}

/// Version descriptor polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// URL of the version descriptor resource
    #[serde(default = "default_version_url")]
    pub version_url: String,
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    /// Consecutive failed checks before a warning is logged
    #[serde(default = "default_failure_warn_threshold")]
    pub failure_warn_threshold: u32,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            version_url: default_version_url(),
            check_interval_seconds: default_check_interval(),
            failure_warn_threshold: default_failure_warn_threshold(),
        }
    }
}

/// User-visible notice settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeConfig {
    /// Surface a transient notice before the refresh is triggered.
    /// When disabled the refresh happens immediately.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Delay between the notice and the refresh, so the notice can be seen
    #[serde(default = "default_notice_delay")]
    pub delay_seconds: u64,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_seconds: default_notice_delay(),
        }
    }
}

/// Refresh hook settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReloadConfig {
    /// Shell command to run when a new version is detected, e.g. a script
    /// that tells a kiosk browser to reload. When unset the version change
    /// is only logged.
    #[serde(default)]
    pub command: Option<String>,
}

fn default_version_url() -> String {
    "http://localhost:8080/version.json".to_string()
}

fn default_check_interval() -> u64 {
    120
}

fn default_failure_warn_threshold() -> u32 {
    5
}

fn default_notice_delay() -> u64 {
    2
}

fn default_true() -> bool {
    true
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::WatchError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
