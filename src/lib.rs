//! Mauka Tables Library
//!
//! Bounded, hash-indexed containers that keep a hash index and an ordering or eviction
//! structure consistent under every mutation:
//!
//! - [`NaluCircularMap`](data_structures::NaluCircularMap): ring-ordered, evicts the oldest
//! - [`LeiLinkedMap`](data_structures::LeiLinkedMap): deque-ordered
//! - [`OhanaMultiMap`](data_structures::OhanaMultiMap): several values per key
//! - [`MoanaLruCache`](data_structures::MoanaLruCache): thread-safe LRU
//! - [`PukaProbeMap`](data_structures::PukaProbeMap): open addressing behind a Bloom filter
//!
//! Supporting modules provide the sizing helpers, the injectable hashing policy, the
//! configuration loader and the synthetic workload driven by the `mauka-tables`
//! binary.

pub mod config;
pub mod data_structures;
pub mod error;
pub mod hashing;
pub mod sizing;
pub mod workload;

// Internal modules that are not part of the public API
#[cfg(test)]
pub(crate) mod tests;

/// Version information for Mauka Tables.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
