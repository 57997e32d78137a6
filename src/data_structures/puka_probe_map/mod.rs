// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Puka Probe Map: open addressing with a Bloom pre-filter.
//!
//! Entries live directly in a flat power-of-two slot array and collisions are resolved
//! by linear probing. A companion [`KonaBloomFilter`](crate::data_structures::KonaBloomFilter)
//! remembers every key ever inserted, so lookups for keys that were never present are
//! answered without probing at all. This suits workloads dominated by misses, such as
//! negative caches and "seen before?" checks.
//!
//! # Example
//!
//! ```
//! use mauka_tables::data_structures::{PukaProbeMap, PukaProbeMapConfig};
//!
//! let mut seen = PukaProbeMap::new(PukaProbeMapConfig::default()).unwrap();
//! seen.insert("GET /index.html", 200).unwrap();
//! seen.insert("GET /missing", 404).unwrap();
//!
//! assert_eq!(seen.get(&"GET /index.html"), Some(&200));
//! assert!(!seen.contains_key(&"POST /login"));
//!
//! seen.remove(&"GET /missing");
//! assert_eq!(seen.len(), 1);
//! assert_eq!(seen.stats().tombstones, 1);
//! ```
//!
//! # Maintenance
//!
//! Removal leaves a tombstone so that probe chains passing through the slot stay
//! intact. Inserts reuse tombstones, and every sixteenth removal checks whether the
//! table should shrink (under 10% live) or be rebuilt in place (over 25% tombstones).
//! Either rebuild also rebuilds the filter, dropping keys that have since been removed.

mod config;
mod map;

pub use config::PukaProbeMapConfig;
pub use map::{Iter, ProbeStats, PukaProbeMap};
