//! Configuration loading traits and types.
//!
//! All binaries read one optional TOML file. Every section and field has a
//! default, so an empty file (or no file at all) yields a working setup for a
//! stock Parallella board.
//!
//! ```toml
//! [shared]
//! log_level = "debug"
//! service_name = "xadctest"
//!
//! [xadc]
//! sensor_root = "/sys/bus/iio/devices/iio:device0"
//! max_channels = 64
//!
//! [gpio]
//! sysfs_root = "/sys/class/gpio"
//! export_settle_ms = 100
//! export_retries = 10
//! ```

use crate::consts::{
    DEFAULT_EXPORT_RETRIES, DEFAULT_EXPORT_SETTLE_MS, DEFAULT_GPIO_ROOT, DEFAULT_IIO_ROOT,
    DEFAULT_SERVICE_NAME, MAX_CHANNELS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
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

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

fn default_iio_root() -> PathBuf {
    PathBuf::from(DEFAULT_IIO_ROOT)
}

fn default_max_channels() -> usize {
    MAX_CHANNELS
}

fn default_gpio_root() -> PathBuf {
    PathBuf::from(DEFAULT_GPIO_ROOT)
}

fn default_export_settle_ms() -> u64 {
    DEFAULT_EXPORT_SETTLE_MS
}

fn default_export_retries() -> u32 {
    DEFAULT_EXPORT_RETRIES
}

/// Common fields shared by every binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
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

/// XADC sensor tree settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct XadcConfig {
    /// IIO device directory holding the `in_*` attribute files.
    #[serde(default = "default_iio_root")]
    pub sensor_root: PathBuf,

    /// Channel limit for the catalog, at most [`MAX_CHANNELS`].
    #[serde(default = "default_max_channels")]
    pub max_channels: usize,
}

impl Default for XadcConfig {
    fn default() -> Self {
        Self {
            sensor_root: default_iio_root(),
            max_channels: default_max_channels(),
        }
    }
}

impl XadcConfig {
    /// Validate the XADC section.
    ///
    /// # Validation Rules
    /// 1. `max_channels` in `1..=MAX_CHANNELS`
    /// 2. `sensor_root` is not empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_channels == 0 || self.max_channels > MAX_CHANNELS {
            return Err(ConfigError::ValidationError(format!(
                "xadc.max_channels must be in 1..={MAX_CHANNELS}, got {}",
                self.max_channels
            )));
        }
        if self.sensor_root.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "xadc.sensor_root cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Sysfs GPIO settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GpioConfig {
    /// GPIO class directory holding `export`, `unexport` and `gpioN/`.
    #[serde(default = "default_gpio_root")]
    pub sysfs_root: PathBuf,

    /// Delay between checks for the `gpioN/` directory after export.
    #[serde(default = "default_export_settle_ms")]
    pub export_settle_ms: u64,

    /// How many times to check for the `gpioN/` directory after export.
    #[serde(default = "default_export_retries")]
    pub export_retries: u32,
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            sysfs_root: default_gpio_root(),
            export_settle_ms: default_export_settle_ms(),
            export_retries: default_export_retries(),
        }
    }
}

impl GpioConfig {
    /// Validate the GPIO section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sysfs_root.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "gpio.sysfs_root cannot be empty".to_string(),
            ));
        }
        if self.export_retries == 0 {
            return Err(ConfigError::ValidationError(
                "gpio.export_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParaConfig {
    /// Shared logging settings.
    #[serde(default)]
    pub shared: SharedConfig,

    /// XADC sensor settings.
    #[serde(default)]
    pub xadc: XadcConfig,

    /// GPIO settings.
    #[serde(default)]
    pub gpio: GpioConfig,
}

impl ParaConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.xadc.validate()?;
        self.gpio.validate()
    }

    /// Load the configuration used by a binary.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_PATH`]
    /// is tried and a missing file falls back to defaults.
    ///
    /// [`DEFAULT_CONFIG_PATH`]: crate::consts::DEFAULT_CONFIG_PATH
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => match Self::load(Path::new(crate::consts::DEFAULT_CONFIG_PATH)) {
                Ok(config) => config,
                Err(ConfigError::FileNotFound) => Self::default(),
                Err(e) => return Err(e),
            },
        };
        config.validate()?;
        Ok(config)
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
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

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
