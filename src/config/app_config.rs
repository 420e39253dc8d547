// ==========================================
// Inventory Count Automation - application configuration
// ==========================================
// Source order: defaults -> config.json -> environment overrides
// The struct is handed to every state machine constructor; there is
// no process-wide delay state.
// ==========================================

use crate::domain::ZeroPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const CONFIG_JSON_FILENAME: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file read failed ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("config file parse failed ({path}): {message}")]
    ParseError { path: String, message: String },

    #[error("invalid config value {key}={value}: {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

// ==========================================
// Terminal section
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub base_url: String,
    pub inventory_transaction: String,
    pub storage_transaction: String,
    pub batch_transaction: String,
    /// Prerequisite value of the warehouse field on the inventory screen
    pub warehouse_number: String,
    pub variant_name: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/sap/bc/gui/sap/its/webgui/#".to_string(),
            inventory_transaction: "LI11N".to_string(),
            storage_transaction: "LX15".to_string(),
            batch_transaction: "SM35".to_string(),
            warehouse_number: "BR2".to_string(),
            variant_name: "MMS3CA".to_string(),
        }
    }
}

// ==========================================
// Timing section (milliseconds)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Pause after each fill / click
    pub settle_ms: u64,
    /// Default wait for a control to appear
    pub default_timeout_ms: u64,
    pub poll_interval_ms: u64,
    /// Wait for the baseline screen after confirming a record
    pub confirm_timeout_ms: u64,
    pub inventory_attempts: u32,
    /// Pause after submitting the inventory document
    pub inventory_settle_ms: u64,
    pub inventory_backoff_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: 1_000,
            default_timeout_ms: 15_000,
            poll_interval_ms: 250,
            confirm_timeout_ms: 15_000,
            inventory_attempts: 3,
            inventory_settle_ms: 900,
            inventory_backoff_ms: 600,
        }
    }
}

// ==========================================
// Storage workflow section
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// F8 presses sent per trigger
    pub f8_press_count: u32,
    pub f8_retry_attempts: u32,
    pub f8_retry_interval_ms: u64,
    pub quick_detection_timeout_ms: u64,
    pub quick_detection_poll_ms: u64,
    /// Short pause right after F8, before quick detection
    pub post_f8_pause_ms: u64,
    /// After the retry loop, one long detection pass
    pub final_full_detection: bool,
    pub full_detection_timeout_ms: u64,
    /// Re-check the storage field before every re-press
    pub revalidate_storage_field: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            f8_press_count: 1,
            f8_retry_attempts: 5,
            f8_retry_interval_ms: 4_000,
            quick_detection_timeout_ms: 5_000,
            quick_detection_poll_ms: 500,
            post_f8_pause_ms: 1_200,
            final_full_detection: true,
            full_detection_timeout_ms: 60_000,
            revalidate_storage_field: true,
        }
    }
}

// ==========================================
// Session section
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Wait for the transaction field on start-up
    pub warmup_timeout_ms: u64,
    pub warmup_retry_delay_ms: u64,
    pub warmup_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            warmup_timeout_ms: 300_000,
            warmup_retry_delay_ms: 15_000,
            warmup_attempts: 1,
        }
    }
}

// ==========================================
// Playback section
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub zero_policy: ZeroPolicy,
    pub screenshots_on_error: bool,
    pub screenshot_dir: PathBuf,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            zero_policy: ZeroPolicy::Mark,
            screenshots_on_error: true,
            screenshot_dir: PathBuf::from("error_screenshots"),
        }
    }
}

// ==========================================
// AppConfig
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub terminal: TerminalConfig,
    pub timing: TimingConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
    pub playback: PlaybackConfig,
}

impl AppConfig {
    /// Loads `path` (or `./config.json` when it exists), then applies
    /// environment overrides and validates the result.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let default_path = PathBuf::from(CONFIG_JSON_FILENAME);
        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None if default_path.is_file() => Some(default_path),
            None => None,
        };

        let mut config = match file {
            Some(p) => Self::from_json_file(&p)?,
            None => {
                debug!("no config file, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_json_str(&text).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;
        info!(path = %path.display(), "config file loaded");
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        serde_json::from_str(text).map_err(|e| ConfigError::ParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Applies environment-style overrides; `lookup` returns the raw value of a key.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn number<T: std::str::FromStr>(key: &str, raw: &str) -> ConfigResult<T> {
            raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
                message: "expected a number".to_string(),
            })
        }

        if let Some(v) = lookup("SAP_BASE_URL") {
            self.terminal.base_url = v.trim().to_string();
        }
        if let Some(v) = lookup("WAREHOUSE_NUMBER") {
            self.terminal.warehouse_number = v.trim().to_string();
        }
        if let Some(v) = lookup("DEFAULT_TIMEOUT_MS") {
            self.timing.default_timeout_ms = number("DEFAULT_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("WAIT_POLL_INTERVAL_MS") {
            self.timing.poll_interval_ms = number("WAIT_POLL_INTERVAL_MS", &v)?;
        }
        if let Some(v) = lookup("SINGLE_RECORD_INTERVAL_MS") {
            self.timing.settle_ms = number("SINGLE_RECORD_INTERVAL_MS", &v)?;
        }
        if let Some(v) = lookup("F8_RETRY_ATTEMPTS") {
            self.storage.f8_retry_attempts = number("F8_RETRY_ATTEMPTS", &v)?;
        }
        if let Some(v) = lookup("ZERO_STOCK_MODE") {
            self.playback.zero_policy = ZeroPolicy::from_str(&v);
        }
        if let Some(v) = lookup("SHOT_ON_ERROR") {
            self.playback.screenshots_on_error = is_true(&v);
        }
        if let Some(v) = lookup("SCREENSHOT_DIR") {
            if !v.trim().is_empty() {
                self.playback.screenshot_dir = PathBuf::from(v.trim());
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let positive: [(&str, u64); 6] = [
            ("timing.default_timeout_ms", self.timing.default_timeout_ms),
            ("timing.poll_interval_ms", self.timing.poll_interval_ms),
            ("timing.confirm_timeout_ms", self.timing.confirm_timeout_ms),
            ("timing.inventory_attempts", self.timing.inventory_attempts as u64),
            ("storage.f8_retry_attempts", self.storage.f8_retry_attempts as u64),
            ("storage.quick_detection_poll_ms", self.storage.quick_detection_poll_ms),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }
        if self.storage.f8_press_count == 0 {
            return Err(ConfigError::InvalidValue {
                key: "storage.f8_press_count".to_string(),
                value: "0".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    // ===== Duration accessors =====

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.timing.settle_ms)
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.timing.default_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.timing.poll_interval_ms)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.timing.confirm_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.terminal.warehouse_number, "BR2");
        assert_eq!(config.timing.inventory_attempts, 3);
        assert_eq!(config.playback.zero_policy, ZeroPolicy::Mark);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json_str(
            r#"{ "timing": { "settle_ms": 10 }, "playback": { "zero_policy": "skip" } }"#,
        )
        .unwrap();
        assert_eq!(config.timing.settle_ms, 10);
        assert_eq!(config.timing.default_timeout_ms, 15_000);
        assert_eq!(config.playback.zero_policy, ZeroPolicy::Skip);
        assert_eq!(config.terminal.variant_name, "MMS3CA");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DEFAULT_TIMEOUT_MS", "2000"),
            ("ZERO_STOCK_MODE", "skip"),
            ("SHOT_ON_ERROR", "off"),
            ("WAREHOUSE_NUMBER", " BR9 "),
            ("SCREENSHOT_DIR", "shots"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.timing.default_timeout_ms, 2000);
        assert_eq!(config.playback.zero_policy, ZeroPolicy::Skip);
        assert!(!config.playback.screenshots_on_error);
        assert_eq!(config.terminal.warehouse_number, "BR9");
        assert_eq!(config.playback.screenshot_dir, PathBuf::from("shots"));
    }

    #[test]
    fn test_bad_numeric_override() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|k| {
            (k == "F8_RETRY_ATTEMPTS").then(|| "many".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = AppConfig::default();
        config.timing.inventory_attempts = 0;
        assert!(config.validate().is_err());
    }
}
