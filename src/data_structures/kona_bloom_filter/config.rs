// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Configuration for the Kona Bloom Filter.

use std::f64::consts::LN_2;

use crate::error::{TableError, TableResult};

/// Upper bound on `expected_items`; larger requests are capped to it.
pub const MAX_EXPECTED_ITEMS: usize = 1 << 26;

/// Upper bound on the number of probe positions per key.
pub const MAX_HASH_FUNCTIONS: u32 = 20;

/// Configuration for the Kona Bloom Filter.
///
/// Sizing follows the textbook optimum: `m = ceil(-n ln p / ln(2)^2)` bits and
/// `k = round((m / n) ln 2)` probes, clamped to `[1, MAX_HASH_FUNCTIONS]`.
#[derive(Debug, Clone, PartialEq)]
pub struct KonaBloomFilterConfig {
    /// Expected number of distinct items
    expected_items: usize,

    /// Target false-positive probability, strictly in (0, 1)
    false_positive_rate: f64,

    /// Explicit probe count; derived from the other two when `None`
    hash_functions: Option<u32>,
}

impl KonaBloomFilterConfig {
    /// Create a new default configuration.
    ///
    /// Default values:
    /// - expected_items: 100,000
    /// - false_positive_rate: 0.01 (1%)
    /// - hash_functions: None (derived)
    pub fn new() -> Self {
        Self {
            expected_items: 100_000,
            false_positive_rate: 0.01,
            hash_functions: None,
        }
    }

    /// Set the expected number of items. Values above [`MAX_EXPECTED_ITEMS`] are capped.
    pub fn with_expected_items(mut self, expected_items: usize) -> Self {
        self.expected_items = expected_items.min(MAX_EXPECTED_ITEMS);
        self
    }

    /// Set the target false-positive rate.
    pub fn with_false_positive_rate(mut self, false_positive_rate: f64) -> Self {
        self.false_positive_rate = false_positive_rate;
        self
    }

    /// Explicitly set the number of probe positions per key.
    pub fn with_hash_functions(mut self, hash_functions: u32) -> Self {
        self.hash_functions = Some(hash_functions);
        self
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// [`TableError::InvalidArgument`] for a zero item count, a rate outside (0, 1),
    /// or an explicit probe count outside `[1, MAX_HASH_FUNCTIONS]`.
    pub fn validate(&self) -> TableResult<()> {
        if self.expected_items == 0 {
            return Err(TableError::invalid_argument(
                "expected_items",
                "must be greater than 0",
            ));
        }
        if !(self.false_positive_rate > 0.0 && self.false_positive_rate < 1.0) {
            return Err(TableError::invalid_argument(
                "false_positive_rate",
                format!(
                    "must be strictly between 0 and 1, got {}",
                    self.false_positive_rate
                ),
            ));
        }
        if let Some(k) = self.hash_functions {
            if k == 0 || k > MAX_HASH_FUNCTIONS {
                return Err(TableError::invalid_argument(
                    "hash_functions",
                    format!("must be between 1 and {MAX_HASH_FUNCTIONS}, got {k}"),
                ));
            }
        }
        Ok(())
    }

    pub fn expected_items(&self) -> usize {
        self.expected_items
    }

    pub fn false_positive_rate(&self) -> f64 {
        self.false_positive_rate
    }

    /// Bit array size `m`.
    pub fn bit_count(&self) -> usize {
        let n = self.expected_items.max(1) as f64;
        let m = -n * self.false_positive_rate.ln() / (LN_2 * LN_2);
        (m.ceil() as usize).max(1)
    }

    /// Probe count `k`.
    pub fn hash_count(&self) -> u32 {
        self.hash_functions.unwrap_or_else(|| {
            let n = self.expected_items.max(1) as f64;
            let k = (self.bit_count() as f64 / n) * LN_2;
            (k.round() as u32).clamp(1, MAX_HASH_FUNCTIONS)
        })
    }
}

impl Default for KonaBloomFilterConfig {
    fn default() -> Self {
        Self::new()
    }
}
