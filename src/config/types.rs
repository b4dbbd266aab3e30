use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::audio::TransportCategory;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub file_output: bool,
    pub console_output: bool,
    pub json_format: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    /// Rotated log files older than this are removed at startup
    pub retention_days: u64,
}

/// How the preferred device is chosen and kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Categories searched, in order, when the startup default is a cast device
    pub fallback_order: Vec<TransportCategory>,
    /// Adopt any non-cast device the user switches to. When false the
    /// device resolved at startup stays preferred for the whole run.
    pub follow_user_selection: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Evaluations slower than this are logged as warnings
    pub slow_evaluation_warn_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file_output: true,
            console_output: true,
            json_format: false,
            log_dir: None,
            retention_days: 7,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            fallback_order: vec![
                TransportCategory::ShortRangeWireless,
                TransportCategory::BuiltIn,
            ],
            follow_user_selection: true,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            slow_evaluation_warn_ms: 250,
            lock_file: None,
        }
    }
}

impl Config {
    /// Load from `config_path`, or the default location when `None`
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let loader = match config_path {
            Some(path) => super::ConfigLoader::new_production(PathBuf::from(path)),
            None => super::ConfigLoader::new_with_default_path()?,
        };
        loader.load_config()
    }

    pub fn validate(&self) -> Result<()> {
        if self.policy.fallback_order.is_empty() {
            bail!("policy.fallback_order must not be empty");
        }

        if self
            .policy
            .fallback_order
            .contains(&TransportCategory::WirelessCast)
        {
            bail!("policy.fallback_order must not contain wireless_cast");
        }

        if self.logging.retention_days == 0 {
            bail!("logging.retention_days must be at least 1");
        }

        if !["trace", "debug", "info", "warn", "error"]
            .contains(&self.general.log_level.to_lowercase().as_str())
        {
            bail!("general.log_level '{}' is not a valid level", self.general.log_level);
        }

        Ok(())
    }
}
