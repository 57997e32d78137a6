// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Kona Bloom Filter.
//!
//! A space-efficient probabilistic set used by [`PukaProbeMap`](super::PukaProbeMap)
//! to short-circuit lookups for keys that were never inserted, and usable on its own
//! for admission control or deduplication.
//!
//! # Features
//!
//! - Bit array and probe count derived from the expected item count and target
//!   false-positive rate.
//! - Double hashing over two avalanche mixes of one FNV fingerprint.
//! - Union of equally shaped filters and an item-count estimate from the fill.
//! - Zero unsafe code.
//!
//! # Example
//!
//! ```
//! use mauka_tables::data_structures::kona_bloom_filter::{KonaBloomFilter, KonaBloomFilterConfig};
//!
//! let config = KonaBloomFilterConfig::new()
//!     .with_expected_items(1_000)
//!     .with_false_positive_rate(0.001);
//! let mut filter = KonaBloomFilter::with_config(config).unwrap();
//!
//! filter.insert("hello");
//! assert!(filter.contains("hello"));
//! ```
//!
//! # Cache Admission Control
//!
//! The classic "cache on second hit" strategy only admits keys the filter has
//! already seen:
//!
//! ```
//! use mauka_tables::data_structures::kona_bloom_filter::KonaBloomFilter;
//!
//! let mut seen = KonaBloomFilter::new(10_000, 0.01).unwrap();
//! let mut admitted = Vec::new();
//!
//! for key in ["a", "b", "a", "c", "b"] {
//!     if seen.contains(key) {
//!         admitted.push(key);
//!     }
//!     seen.insert(key);
//! }
//! assert_eq!(admitted, vec!["a", "b"]);
//! ```

mod config;
mod filter;
pub(crate) mod hash;

pub use config::{KonaBloomFilterConfig, MAX_EXPECTED_ITEMS, MAX_HASH_FUNCTIONS};
pub use filter::KonaBloomFilter;
