// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Ohana Multi Map: one key, a family of values.
//!
//! Each key owns its values in insertion order, and keys themselves are ordered by
//! first insertion. A fixed-capacity map bounds the number of keys and evicts the
//! oldest key (with all of its values) to admit a new one.
//!
//! # Example
//!
//! ```
//! use mauka_tables::data_structures::{OhanaMultiMap, TableConfig};
//!
//! let mut ohana = OhanaMultiMap::new(TableConfig::default()).unwrap();
//! ohana.insert("keiki", "lani");
//! ohana.insert("keiki", "kai");
//! ohana.insert("makua", "pono");
//!
//! assert_eq!(ohana.get(&"keiki"), Some(&["lani", "kai"][..]));
//! assert_eq!(ohana.len(), 2);
//! assert_eq!(ohana.value_count(), 3);
//! ```

mod map;

pub use map::{Iter, OhanaMultiMap};
