//! Configuration error module.
//!
//! This module defines error types that may occur during configuration loading,
//! parsing, and validation operations.

use std::path::PathBuf;
use thiserror::Error;

use super::table::TableError;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error when the configuration file is missing.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Error when parsing the configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(String),

    /// Error when validating the configuration.
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// Error when a configuration value is out of the valid range.
    #[error("Configuration value {key} is out of valid range: {message}")]
    ValueOutOfRange {
        /// The key of the invalid value
        key: String,
        /// Description of the valid range
        message: String,
    },
}

impl ConfigError {
    /// Wraps a container construction fault raised while validating `section`.
    pub fn from_table(section: &str, error: TableError) -> Self {
        match error {
            TableError::InvalidArgument { name, reason } => Self::ValueOutOfRange {
                key: format!("{section}.{name}"),
                message: reason,
            },
            other => Self::ValidationError(format!("{section}: {other}")),
        }
    }
}
