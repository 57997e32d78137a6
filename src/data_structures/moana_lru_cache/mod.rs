// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Moana LRU Cache: a thread-safe least-recently-used cache.
//!
//! Two synchronization domains keep readers out of each other's way:
//!
//! - the hash table, split into independently locked buckets behind a table lock that
//!   is only taken exclusively for resize and clear;
//! - the recency list, behind a single reader-writer lock.
//!
//! Lookups stay within one bucket. Inserts and updates take the list write lock
//! briefly to promote the entry. Eviction reads the list tail, releases the list, and
//! revalidates the victim under its bucket lock before unlinking it.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use mauka_tables::data_structures::{MoanaLruCache, TableConfig};
//!
//! let cache = Arc::new(MoanaLruCache::new(TableConfig::fixed(128)).unwrap());
//!
//! let handles: Vec<_> = (0..4u32)
//!     .map(|t| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || {
//!             for i in 0..100u32 {
//!                 cache.put(t * 1_000 + i, i);
//!             }
//!         })
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert!(cache.len() <= 128);
//! assert!(cache.consistency_check());
//! ```

mod cache;
mod recency;

pub use cache::MoanaLruCache;
