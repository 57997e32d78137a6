//! Synthetic workload configuration module.

use serde::{Deserialize, Serialize};

use super::{ConfigResult, Validate};
use crate::error::config::ConfigError;

/// Settings for the `exercise` command's synthetic workload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadSettings {
    /// Operations issued against each container
    pub operations: usize,

    /// Number of distinct keys drawn from
    pub key_space: u64,

    /// Fraction of operations that are lookups; the rest are inserts
    pub read_ratio: f64,

    /// Fraction of the write operations that remove instead of insert
    pub remove_ratio: f64,

    /// Threads driving the concurrent cache; all logical CPUs when absent
    pub threads: Option<usize>,
}

impl Default for WorkloadSettings {
    fn default() -> Self {
        Self {
            operations: 100_000,
            key_space: 4_096,
            read_ratio: 0.8,
            remove_ratio: 0.1,
            threads: None,
        }
    }
}

impl WorkloadSettings {
    /// Thread count for concurrent runs.
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get).max(1)
    }
}

impl Validate for WorkloadSettings {
    fn validate(&self) -> ConfigResult<()> {
        if self.operations == 0 {
            return Err(ConfigError::ValidationError(
                "operations must be greater than 0".to_string(),
            ));
        }

        if self.key_space == 0 {
            return Err(ConfigError::ValidationError(
                "key_space must be greater than 0".to_string(),
            ));
        }

        for (key, ratio) in [("read_ratio", self.read_ratio), ("remove_ratio", self.remove_ratio)] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(ConfigError::ValueOutOfRange {
                    key: format!("workload.{key}"),
                    message: format!("must be between 0.0 and 1.0 inclusive, got {ratio}"),
                });
            }
        }

        if self.threads == Some(0) {
            return Err(ConfigError::ValidationError(
                "threads must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}
