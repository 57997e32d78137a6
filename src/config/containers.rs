//! Container configuration module.
//!
//! Serializable settings for each container and the hashing policy. Every section
//! converts into the container's own construction options and is validated by the same
//! rules the container applies, so a configuration that loads always constructs.

use serde::{Deserialize, Serialize};

use super::{ConfigResult, Validate};
use crate::data_structures::{CapacityMode, KonaBloomFilterConfig, PukaProbeMapConfig, TableConfig};
use crate::error::config::ConfigError;
use crate::hashing::HashingPolicy;

/// Hashing policy settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HashingSettings {
    /// Use per-instance random hash keys
    pub randomized: bool,

    /// Warn about lookups whose chain or probe sequence is longer than this
    pub collision_threshold: Option<usize>,
}

impl HashingSettings {
    /// Builds the policy these settings describe.
    pub fn to_policy(&self) -> HashingPolicy {
        let policy = HashingPolicy::new().with_randomized(self.randomized);
        match self.collision_threshold {
            Some(threshold) => policy.with_collision_threshold(threshold),
            None => policy,
        }
    }
}

impl Validate for HashingSettings {
    fn validate(&self) -> ConfigResult<()> {
        self.to_policy()
            .validate()
            .map_err(|e| ConfigError::from_table("hashing", e))
    }
}

/// Settings for a chained container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// Initial size, or the maximum in fixed mode
    pub capacity: usize,

    /// `dynamic` or `fixed`
    pub mode: CapacityMode,

    /// Index load factor, strictly between 0.0 and 1.0
    pub load_factor: f64,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            capacity: 1024,
            mode: CapacityMode::Fixed,
            load_factor: 0.75,
        }
    }
}

impl ContainerSettings {
    /// Construction options for a container configured by these settings.
    pub fn to_table_config(&self, hashing: &HashingSettings) -> TableConfig {
        TableConfig::new()
            .with_capacity(self.capacity)
            .with_mode(self.mode)
            .with_load_factor(self.load_factor)
            .with_hashing(hashing.to_policy())
    }

    /// Validates the settings, naming `section` in any error.
    pub fn validate_section(&self, section: &str, hashing: &HashingSettings) -> ConfigResult<()> {
        self.to_table_config(hashing)
            .validate()
            .map_err(|e| ConfigError::from_table(section, e))
    }
}

impl Validate for ContainerSettings {
    fn validate(&self) -> ConfigResult<()> {
        self.validate_section("container", &HashingSettings::default())
    }
}

/// Settings for the probe map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Initial slot count, rounded up to a power of two
    pub initial_capacity: usize,

    /// Slot load factor, strictly between 0.0 and 1.0
    pub load_factor: f64,

    /// Companion filter false-positive rate
    pub false_positive_rate: f64,

    /// Probe distance that triggers an eager resize
    pub max_probe_distance: usize,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        let defaults = PukaProbeMapConfig::default();
        Self {
            initial_capacity: defaults.initial_capacity,
            load_factor: defaults.load_factor,
            false_positive_rate: defaults.false_positive_rate,
            max_probe_distance: defaults.max_probe_distance,
        }
    }
}

impl ProbeSettings {
    /// Construction options for a probe map configured by these settings.
    pub fn to_probe_config(&self, hashing: &HashingSettings) -> PukaProbeMapConfig {
        PukaProbeMapConfig::new()
            .with_initial_capacity(self.initial_capacity)
            .with_load_factor(self.load_factor)
            .with_false_positive_rate(self.false_positive_rate)
            .with_max_probe_distance(self.max_probe_distance)
            .with_hashing(hashing.to_policy())
    }
}

impl Validate for ProbeSettings {
    fn validate(&self) -> ConfigResult<()> {
        self.to_probe_config(&HashingSettings::default())
            .validate()
            .map_err(|e| ConfigError::from_table("puka", e))
    }
}

/// Settings for a standalone Bloom filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomSettings {
    /// Number of items the filter is sized for
    pub expected_items: usize,

    /// Target false-positive rate at `expected_items`
    pub false_positive_rate: f64,

    /// Explicit probe count; derived from the sizing when absent
    pub hash_functions: Option<u32>,
}

impl Default for BloomSettings {
    fn default() -> Self {
        let defaults = KonaBloomFilterConfig::default();
        Self {
            expected_items: defaults.expected_items(),
            false_positive_rate: defaults.false_positive_rate(),
            hash_functions: None,
        }
    }
}

impl BloomSettings {
    /// Filter configuration described by these settings.
    pub fn to_filter_config(&self) -> KonaBloomFilterConfig {
        let config = KonaBloomFilterConfig::new()
            .with_expected_items(self.expected_items)
            .with_false_positive_rate(self.false_positive_rate);
        match self.hash_functions {
            Some(k) => config.with_hash_functions(k),
            None => config,
        }
    }
}

impl Validate for BloomSettings {
    fn validate(&self) -> ConfigResult<()> {
        self.to_filter_config()
            .validate()
            .map_err(|e| ConfigError::from_table("bloom", e))
    }
}
