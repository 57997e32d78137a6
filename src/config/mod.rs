//! Configuration module for Mauka Tables.
//!
//! Settings for every container, the hashing policy, logging and the synthetic
//! workload are grouped in [`TablesConfig`]. [`ConfigLoader`] layers built-in defaults,
//! an optional TOML, JSON or YAML file, and `MAUKA_TABLES__*` environment overrides,
//! then validates the result before handing it out.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError as ExternalConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::config::ConfigError;

pub mod containers;
pub mod workload;

pub use containers::{BloomSettings, ContainerSettings, HashingSettings, ProbeSettings};
pub use workload::WorkloadSettings;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Default environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "MAUKA_TABLES";

/// A trait for types that can be validated.
pub trait Validate {
    /// Validates that the configuration is correct.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the configuration is valid
    /// * `Err(ConfigError)` if the configuration is invalid
    fn validate(&self) -> ConfigResult<()>;
}

/// Top-level configuration for Mauka Tables.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TablesConfig {
    /// Log configuration
    pub log: LogConfig,

    /// Hashing policy shared by every container
    pub hashing: HashingSettings,

    /// Circular map settings
    pub nalu: ContainerSettings,

    /// Linked map settings
    pub lei: ContainerSettings,

    /// Multi-value map settings
    pub ohana: ContainerSettings,

    /// LRU cache settings
    pub moana: ContainerSettings,

    /// Probe map settings
    pub puka: ProbeSettings,

    /// Standalone Bloom filter settings
    pub bloom: BloomSettings,

    /// Synthetic workload settings
    pub workload: WorkloadSettings,
}

impl Validate for TablesConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.log.validate()?;
        self.hashing.validate()?;
        for (section, settings) in self.container_sections() {
            settings.validate_section(section, &self.hashing)?;
        }
        self.puka.validate()?;
        self.bloom.validate()?;
        self.workload.validate()?;
        Ok(())
    }
}

impl TablesConfig {
    /// Named chained-container sections, in declaration order.
    pub fn container_sections(&self) -> [(&'static str, &ContainerSettings); 4] {
        [
            ("nalu", &self.nalu),
            ("lei", &self.lei),
            ("ohana", &self.ohana),
            ("moana", &self.moana),
        ]
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Writes the configuration to `path` as TOML.
    pub fn write_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let rendered = self.to_toml()?;
        std::fs::write(path.as_ref(), rendered).map_err(|e| {
            ConfigError::ParseError(format!("Cannot write {}: {e}", path.as_ref().display()))
        })
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Whether to log in JSON format
    pub json: bool,

    /// Whether to include source code locations in logs
    pub source_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            source_location: false,
        }
    }
}

impl Validate for LogConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::ValidationError(format!(
                "Invalid log level: {}",
                self.level
            ))),
        }
    }
}

/// Configuration loader for Mauka Tables.
#[derive(Debug)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(None::<PathBuf>, ENV_PREFIX)
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Optional path to the configuration file
    /// * `env_prefix` - Prefix for environment variables that override configuration values
    pub fn new<P: AsRef<Path>>(config_path: Option<P>, env_prefix: &str) -> Self {
        Self {
            config_path: config_path.map(|p| p.as_ref().to_path_buf()),
            env_prefix: env_prefix.to_string(),
        }
    }

    /// Loads the configuration from defaults, the file and environment variables.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::FileNotFound`] if a configured file does not exist
    /// * [`ConfigError::ParseError`] if a source cannot be read or deserialized
    /// * [`ConfigError::ValidationError`] or [`ConfigError::ValueOutOfRange`] if the
    ///   merged configuration is invalid
    pub fn load(&self) -> ConfigResult<TablesConfig> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&TablesConfig::default())
                .map_err(|e| ConfigError::ParseError(e.to_string()))?,
        );

        if let Some(path) = &self.config_path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            let format = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => FileFormat::Toml,
                Some("json") => FileFormat::Json,
                Some("yaml" | "yml") => FileFormat::Yaml,
                _ => {
                    return Err(ConfigError::ParseError(format!(
                        "Unsupported file extension for: {path:?}"
                    )))
                }
            };
            builder = builder.add_source(File::from(path.as_path()).format(format));
        }

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        let config: TablesConfig = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(map_external_error)?;

        config.validate()?;
        tracing::debug!(
            path = ?self.config_path,
            prefix = %self.env_prefix,
            "Configuration loaded"
        );
        Ok(config)
    }
}

fn map_external_error(error: ExternalConfigError) -> ConfigError {
    match error {
        ExternalConfigError::NotFound(path) => ConfigError::FileNotFound(PathBuf::from(path)),
        ExternalConfigError::FileParse { uri, cause } => ConfigError::ParseError(format!(
            "Error parsing {}: {cause}",
            uri.as_deref().unwrap_or("config file")
        )),
        other => ConfigError::ParseError(other.to_string()),
    }
}
