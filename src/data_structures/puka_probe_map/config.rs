// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Configuration options for the Puka Probe Map.

use crate::data_structures::config::{validate_capacity, validate_load_factor};
use crate::error::{TableError, TableResult};
use crate::hashing::HashingPolicy;

/// Configuration for the Puka Probe Map.
#[derive(Debug, Clone)]
pub struct PukaProbeMapConfig {
    /// Initial slot count, rounded up to a power of two.
    /// The map never shrinks below this.
    pub initial_capacity: usize,

    /// Fraction of slots (live plus tombstones) that may be in use before a resize.
    pub load_factor: f64,

    /// Target false-positive rate of the companion Bloom filter.
    pub false_positive_rate: f64,

    /// Probe distance past which an insert triggers an eager resize.
    pub max_probe_distance: usize,

    /// Randomized hashing and collision monitoring.
    pub hashing: HashingPolicy,
}

impl PukaProbeMapConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial slot count.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Sets the load factor, strictly in (0, 1).
    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Sets the Bloom filter false-positive rate, strictly in (0, 1).
    pub fn with_false_positive_rate(mut self, false_positive_rate: f64) -> Self {
        self.false_positive_rate = false_positive_rate;
        self
    }

    /// Sets the probe distance bound.
    pub fn with_max_probe_distance(mut self, max_probe_distance: usize) -> Self {
        self.max_probe_distance = max_probe_distance;
        self
    }

    /// Sets the hashing policy.
    pub fn with_hashing(mut self, hashing: HashingPolicy) -> Self {
        self.hashing = hashing;
        self
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// [`TableError::InvalidArgument`] naming the first bad field.
    pub fn validate(&self) -> TableResult<()> {
        validate_capacity("initial_capacity", self.initial_capacity)?;
        validate_load_factor(self.load_factor)?;
        if !(self.false_positive_rate > 0.0 && self.false_positive_rate < 1.0) {
            return Err(TableError::invalid_argument(
                "false_positive_rate",
                format!(
                    "must be strictly between 0 and 1, got {}",
                    self.false_positive_rate
                ),
            ));
        }
        if self.max_probe_distance == 0 {
            return Err(TableError::invalid_argument(
                "max_probe_distance",
                "must be greater than 0",
            ));
        }
        self.hashing.validate()
    }
}

impl Default for PukaProbeMapConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 16,
            load_factor: 0.75,
            false_positive_rate: 0.01,
            max_probe_distance: 64,
            hashing: HashingPolicy::default(),
        }
    }
}
