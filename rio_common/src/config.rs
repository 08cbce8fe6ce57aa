//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load TOML configuration files
//! across the rio workspace, plus the notifier-specific configuration table
//! consumed by the demo binary.
//!
//! # Usage
//!
//! ```rust,no_run
//! use rio_common::config::{AppConfig, ConfigError, ConfigLoader};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = AppConfig::load(Path::new("config.toml"))?;
//!     config.validate()?;
//!     println!("driver: {}", config.notifier.driver);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

/// Common configuration fields shared across rio applications.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "rio-notifier-demo"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Notifier configuration table.
///
/// # TOML Example
///
/// ```toml
/// [notifier]
/// driver = "host"
/// period_ms = 20
/// real_time = false
/// priority = 40
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierSection {
    /// Alarm driver name ("host" or "sim").
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Callback period in milliseconds.
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// Request SCHED_FIFO for alarm delivery.
    #[serde(default)]
    pub real_time: bool,

    /// SCHED_FIFO priority (1-99), only meaningful with `real_time`.
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_driver() -> String {
    "host".to_string()
}

fn default_period_ms() -> u64 {
    20
}

fn default_priority() -> i32 {
    crate::hal::consts::DEFAULT_RT_PRIORITY
}

impl Default for NotifierSection {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            period_ms: default_period_ms(),
            real_time: false,
            priority: default_priority(),
        }
    }
}

impl NotifierSection {
    /// Validate the notifier table.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `period_ms` is zero (the scheduler rejects non-positive periods)
    /// - `real_time` is set with a priority outside 1-99
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period_ms == 0 {
            return Err(ConfigError::ValidationError(
                "notifier.period_ms must be positive".to_string(),
            ));
        }
        if self.real_time && !(1..=99).contains(&self.priority) {
            return Err(ConfigError::ValidationError(format!(
                "notifier.priority must be in 1..=99 for real_time, got {}",
                self.priority
            )));
        }
        Ok(())
    }
}

/// Top-level application configuration for the demo binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Shared service fields.
    pub shared: SharedConfig,

    /// Notifier table.
    #[serde(default)]
    pub notifier: NotifierSection,
}

impl AppConfig {
    /// Validate all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.notifier.validate()
    }
}

/// Trait for loading configuration from TOML files.
///
/// Provides a default implementation for any type implementing
/// `serde::de::DeserializeOwned`.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML configuration file
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
