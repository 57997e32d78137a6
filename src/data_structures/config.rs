// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Construction options shared by the chained containers.

use serde::{Deserialize, Serialize};

use crate::error::{TableError, TableResult};
use crate::hashing::HashingPolicy;
use crate::sizing::MAX_CAPACITY;

/// Whether a container may grow past its initial capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityMode {
    /// Grow without bound; `capacity` is only the initial sizing hint.
    Dynamic,
    /// `capacity` is a hard maximum; inserting past it evicts.
    Fixed,
}

impl Default for CapacityMode {
    fn default() -> Self {
        Self::Dynamic
    }
}

/// Configuration for [`NaluCircularMap`](super::NaluCircularMap),
/// [`LeiLinkedMap`](super::LeiLinkedMap), [`OhanaMultiMap`](super::OhanaMultiMap) and
/// [`MoanaLruCache`](super::MoanaLruCache).
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Initial size, or the maximum in [`CapacityMode::Fixed`]; at most
    /// [`MAX_CAPACITY`](crate::sizing::MAX_CAPACITY)
    pub capacity: usize,

    /// Growth behaviour; immutable after construction
    pub mode: CapacityMode,

    /// Entries per bucket before the chained index grows, strictly in (0, 1)
    pub load_factor: f64,

    /// Randomized hashing and collision monitoring
    pub hashing: HashingPolicy,
}

impl TableConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed-capacity configuration holding at most `capacity` entries.
    pub fn fixed(capacity: usize) -> Self {
        Self::new()
            .with_capacity(capacity)
            .with_mode(CapacityMode::Fixed)
    }

    /// Sets the initial (or maximum) capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the capacity mode.
    pub fn with_mode(mut self, mode: CapacityMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the load factor.
    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
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
    /// Returns [`TableError::InvalidArgument`] naming the first bad field.
    pub fn validate(&self) -> TableResult<()> {
        validate_capacity("capacity", self.capacity)?;
        validate_load_factor(self.load_factor)?;
        self.hashing.validate()
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            capacity: 16,
            mode: CapacityMode::Dynamic,
            load_factor: 0.75,
            hashing: HashingPolicy::default(),
        }
    }
}

/// Rejects zero and anything above [`MAX_CAPACITY`].
pub(crate) fn validate_capacity(name: &'static str, capacity: usize) -> TableResult<()> {
    if capacity == 0 {
        return Err(TableError::invalid_argument(name, "must be greater than 0"));
    }
    if capacity > MAX_CAPACITY {
        return Err(TableError::invalid_argument(
            name,
            format!("{capacity} exceeds the maximum of {MAX_CAPACITY}"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_load_factor(load_factor: f64) -> TableResult<()> {
    if !(load_factor > 0.0 && load_factor < 1.0) {
        return Err(TableError::invalid_argument(
            "load_factor",
            format!("must be strictly between 0 and 1, got {load_factor}"),
        ));
    }
    Ok(())
}
