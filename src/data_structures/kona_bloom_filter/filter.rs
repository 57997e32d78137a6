// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Main implementation of the Kona Bloom Filter.

use std::fmt;
use std::hash::Hash;

use crate::data_structures::kona_bloom_filter::config::KonaBloomFilterConfig;
use crate::data_structures::kona_bloom_filter::hash::{fingerprint, ProbeSequence};
use crate::error::{TableError, TableResult};

/// A fixed-size Bloom filter.
///
/// Membership answers are probabilistic-positive and deterministic-negative: after
/// `insert(x)`, `contains(x)` is `true` forever (until [`clear`](Self::clear)). Items
/// can never be removed individually.
///
/// # Examples
///
/// ```
/// use mauka_tables::data_structures::kona_bloom_filter::KonaBloomFilter;
///
/// let mut filter = KonaBloomFilter::new(1_000, 0.01).unwrap();
/// filter.insert("hello_world");
///
/// assert!(filter.contains("hello_world"));
/// assert!(filter.estimate_item_count() > 0.5);
/// ```
#[derive(Clone)]
pub struct KonaBloomFilter {
    /// Configuration the filter was sized from
    config: KonaBloomFilterConfig,

    /// Bit array, 64 bits per word
    bits: Vec<u64>,

    /// `m`
    bit_count: usize,

    /// `k`
    hash_count: u32,

    /// Insert calls since construction or the last clear
    items: usize,
}

impl KonaBloomFilter {
    /// Creates a filter sized for `expected_items` at `false_positive_rate`.
    ///
    /// # Errors
    ///
    /// [`TableError::InvalidArgument`] if the count is zero or the rate is outside (0, 1).
    pub fn new(expected_items: usize, false_positive_rate: f64) -> TableResult<Self> {
        Self::with_config(
            KonaBloomFilterConfig::new()
                .with_expected_items(expected_items)
                .with_false_positive_rate(false_positive_rate),
        )
    }

    /// Creates a filter from an explicit configuration.
    pub fn with_config(config: KonaBloomFilterConfig) -> TableResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: KonaBloomFilterConfig) -> Self {
        let bit_count = config.bit_count();
        let hash_count = config.hash_count();
        Self {
            bits: vec![0; bit_count.div_ceil(64)],
            bit_count,
            hash_count,
            items: 0,
            config,
        }
    }

    /// Adds `item`. Returns `true` if at least one bit changed.
    pub fn insert<T: Hash + ?Sized>(&mut self, item: &T) -> bool {
        self.insert_hash(fingerprint(item))
    }

    /// Adds an already-hashed key.
    pub fn insert_hash(&mut self, hash: u64) -> bool {
        let mut changed = false;
        for pos in ProbeSequence::new(hash, self.hash_count, self.bit_count) {
            let (word, mask) = (pos / 64, 1u64 << (pos % 64));
            if self.bits[word] & mask == 0 {
                self.bits[word] |= mask;
                changed = true;
            }
        }
        self.items = self.items.saturating_add(1);
        changed
    }

    /// `false` means `item` was definitely never inserted.
    pub fn contains<T: Hash + ?Sized>(&self, item: &T) -> bool {
        self.contains_hash(fingerprint(item))
    }

    /// Membership test for an already-hashed key.
    pub fn contains_hash(&self, hash: u64) -> bool {
        ProbeSequence::new(hash, self.hash_count, self.bit_count)
            .all(|pos| self.bits[pos / 64] & (1u64 << (pos % 64)) != 0)
    }

    /// ORs `other` into `self`.
    ///
    /// # Errors
    ///
    /// [`TableError::InvalidArgument`] unless both filters have the same bit count and
    /// probe count.
    pub fn union(&mut self, other: &KonaBloomFilter) -> TableResult<()> {
        if self.bit_count != other.bit_count || self.hash_count != other.hash_count {
            return Err(TableError::invalid_argument(
                "other",
                format!(
                    "filter shape mismatch: {} bits/{} probes vs {} bits/{} probes",
                    self.bit_count, self.hash_count, other.bit_count, other.hash_count
                ),
            ));
        }
        for (word, theirs) in self.bits.iter_mut().zip(&other.bits) {
            *word |= theirs;
        }
        self.items = self.items.saturating_add(other.items);
        Ok(())
    }

    /// Estimates the number of distinct items from the fill: `-(m/k) ln(1 - X/m)`.
    ///
    /// Returns `f64::INFINITY` once every bit is set.
    pub fn estimate_item_count(&self) -> f64 {
        let m = self.bit_count as f64;
        let set = self.set_bits() as f64;
        if set >= m {
            return f64::INFINITY;
        }
        -(m / f64::from(self.hash_count)) * (1.0 - set / m).ln()
    }

    /// Number of insert calls, duplicates included.
    pub fn item_count(&self) -> usize {
        self.items
    }

    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    pub fn hash_count(&self) -> u32 {
        self.hash_count
    }

    /// Fraction of bits set, in `[0, 1]`.
    pub fn fill_ratio(&self) -> f64 {
        self.set_bits() as f64 / self.bit_count as f64
    }

    /// False-positive probability at the current fill: `fill_ratio ^ k`.
    pub fn estimated_false_positive_rate(&self) -> f64 {
        self.fill_ratio().powi(self.hash_count as i32)
    }

    /// Reset the filter to empty state.
    pub fn clear(&mut self) {
        self.bits.iter_mut().for_each(|word| *word = 0);
        self.items = 0;
    }

    /// Whether no bit is set.
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&word| word == 0)
    }

    /// Get the configuration of this filter.
    pub fn config(&self) -> &KonaBloomFilterConfig {
        &self.config
    }

    fn set_bits(&self) -> usize {
        self.bits.iter().map(|word| word.count_ones() as usize).sum()
    }
}

impl Default for KonaBloomFilter {
    fn default() -> Self {
        Self::build(KonaBloomFilterConfig::default())
    }
}

impl fmt::Debug for KonaBloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KonaBloomFilter")
            .field("bit_count", &self.bit_count)
            .field("hash_count", &self.hash_count)
            .field("items", &self.items)
            .field("fill_ratio", &self.fill_ratio())
            .finish()
    }
}
