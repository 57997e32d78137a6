//! Hash-indexed containers for Mauka Tables.
//!
//! Every container pairs a hash index with a second structure that decides ordering or
//! eviction, and keeps the two consistent across every mutation:
//!
//! - [`NaluCircularMap`]: ring of slots, oldest entry evicted first
//! - [`LeiLinkedMap`]: deque order with eviction from the opposite end
//! - [`OhanaMultiMap`]: several values per key in insertion order
//! - [`MoanaLruCache`]: thread-safe least-recently-used cache
//! - [`PukaProbeMap`]: open addressing behind a [`KonaBloomFilter`]
//!
//! The chained variants share their node arena, bucket index and ordering list through
//! the crate-private `table` module.

pub mod config;
pub mod kona_bloom_filter;
pub mod lei_linked_map;
pub mod moana_lru_cache;
pub mod nalu_circular_map;
pub mod ohana_multi_map;
pub mod puka_probe_map;

mod table;

pub use config::{CapacityMode, TableConfig};
pub use kona_bloom_filter::{KonaBloomFilter, KonaBloomFilterConfig};
pub use lei_linked_map::LeiLinkedMap;
pub use moana_lru_cache::MoanaLruCache;
pub use nalu_circular_map::{NaluCircularMap, RingStats};
pub use ohana_multi_map::OhanaMultiMap;
pub use puka_probe_map::{ProbeStats, PukaProbeMap, PukaProbeMapConfig};
pub use table::Cursor;
