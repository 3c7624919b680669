//! Configuration management for the friends console host.
//!
//! Loads the host configuration from TOML, writing a default file on first
//! run, and applies command-line overrides.

use anyhow::Context;
use plugin_friends::FriendsConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::cli::CliArgs;

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Friends plugin settings
    #[serde(default)]
    pub friends: FriendsConfig,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Console loop settings
    #[serde(default)]
    pub console: ConsoleSettings,
}

/// Logging system configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Interval between sweeps of expired friend requests, in milliseconds
    #[serde(default = "default_expiry_sweep_ms")]
    pub expiry_sweep_ms: u64,
    /// Print chat messages as JSON components instead of plain text
    #[serde(default)]
    pub json_chat: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_expiry_sweep_ms() -> u64 {
    1000
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            expiry_sweep_ms: default_expiry_sweep_ms(),
            json_chat: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from file, creating it with defaults when missing
    pub async fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config: AppConfig = toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(data_dir) = &args.data_dir {
            self.friends.data_folder = data_dir.clone();
        }

        if let Some(log_level) = &args.log_level {
            self.logging.level = log_level.clone();
        }

        if args.json_logs {
            self.logging.json_format = true;
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.friends.validate()?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level, valid_levels
            ));
        }

        if self.console.expiry_sweep_ms == 0 {
            return Err("Expiry sweep interval must be greater than 0".to_string());
        }

        Ok(())
    }
}
