// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Nalu Circular Map: a bounded recency window with hash lookup.
//!
//! Entries occupy a ring of slots in insertion order. A full fixed-capacity ring
//! evicts its oldest entry to make room, which makes the map a natural fit for
//! "last N events by key" tracking.
//!
//! ```text
//!          head (oldest)          tail (newest)
//!            v                      v
//!   [ . ][ a ][ b ][ . ][ d ][ e ][ f ][ . ]
//!                  hole
//! ```
//!
//! # Example
//!
//! ```
//! use mauka_tables::data_structures::{NaluCircularMap, TableConfig};
//!
//! let mut recent = NaluCircularMap::new(TableConfig::fixed(2)).unwrap();
//! recent.insert("A", 1).unwrap();
//! recent.insert("B", 2).unwrap();
//! recent.insert("C", 3).unwrap();
//!
//! assert!(!recent.contains_key(&"A"));
//! assert_eq!(recent.oldest().unwrap(), (&"B", &2));
//! assert_eq!(recent.newest().unwrap(), (&"C", &3));
//! ```

mod map;
mod node;

pub use map::{Iter, NaluCircularMap, RingStats};
