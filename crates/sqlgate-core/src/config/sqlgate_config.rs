//! Top-level sqlgate configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ConsoleConfig, JournalMode, StorageConfig};
use crate::errors::ConfigError;

/// Project config file name, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "sqlgate.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`SQLGATE_*`)
/// 2. Project config (`sqlgate.toml` in project root)
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SqlGateConfig {
    pub storage: StorageConfig,
    pub console: ConsoleConfig,
}

impl SqlGateConfig {
    /// Load configuration with layered resolution. A missing project file
    /// is not an error; a malformed one is.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: SqlGateConfig =
            toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
                path: "<string>".to_string(),
                message: e.to_string(),
            })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &SqlGateConfig) -> Result<(), ConfigError> {
        if config.storage.busy_timeout_ms == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "storage.busy_timeout_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.console.effective_close_delay() > config.console.effective_max_close_delay() {
            return Err(ConfigError::ValidationFailed {
                field: "console.default_close_delay_ms".to_string(),
                message: "must not exceed console.max_close_delay_ms".to_string(),
            });
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    fn merge_toml_file(config: &mut SqlGateConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: SqlGateConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; only `Some` values in `other` win.
    fn merge(base: &mut SqlGateConfig, other: &SqlGateConfig) {
        if other.storage.busy_timeout_ms.is_some() {
            base.storage.busy_timeout_ms = other.storage.busy_timeout_ms;
        }
        if other.storage.journal_mode.is_some() {
            base.storage.journal_mode = other.storage.journal_mode;
        }

        if other.console.default_success_message.is_some() {
            base.console.default_success_message = other.console.default_success_message.clone();
        }
        if other.console.default_close_delay_ms.is_some() {
            base.console.default_close_delay_ms = other.console.default_close_delay_ms;
        }
        if other.console.max_close_delay_ms.is_some() {
            base.console.max_close_delay_ms = other.console.max_close_delay_ms;
        }
    }

    /// Apply environment variable overrides. Unparseable values are ignored.
    fn apply_env_overrides(config: &mut SqlGateConfig) {
        if let Ok(val) = std::env::var("SQLGATE_BUSY_TIMEOUT_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.storage.busy_timeout_ms = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SQLGATE_JOURNAL_MODE") {
            match JournalMode::parse(&val) {
                Some(mode) => config.storage.journal_mode = Some(mode),
                None => ::tracing::warn!(value = %val, "ignoring unknown SQLGATE_JOURNAL_MODE"),
            }
        }
        if let Ok(val) = std::env::var("SQLGATE_CLOSE_DELAY_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.console.default_close_delay_ms = Some(v);
            }
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            field: "<root>".to_string(),
            message: e.to_string(),
        })
    }
}
