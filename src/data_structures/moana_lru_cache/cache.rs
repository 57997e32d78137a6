// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Implementation of the Moana LRU Cache.
//!
//! Lock order is table → bucket → recency list. The list lock is never held while a
//! bucket lock is being acquired.

use std::fmt;
use std::hash::Hash;
use std::mem;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::data_structures::config::{CapacityMode, TableConfig};
use crate::data_structures::moana_lru_cache::recency::{RecencyList, RecencyNode, Victim};
use crate::error::TableResult;
use crate::hashing::{KeyComparer, KeyHasher};
use crate::sizing::{chained_bucket_count, next_prime};

struct BucketEntry<K, V> {
    key: K,
    value: V,
    hash: u32,
    /// Index of this entry's node in the recency list
    node: usize,
    /// Clock value of the last promotion; shared with the recency node
    stamp: u64,
    /// Clock value of the last `get`
    last_access: u64,
}

type Buckets<K, V> = Box<[Mutex<Vec<BucketEntry<K, V>>>]>;

enum PutOutcome<V> {
    Updated(V),
    Inserted { previous_count: usize },
}

/// A thread-safe, bounded least-recently-used cache.
///
/// Lookups lock a single bucket and never touch the recency list: a hit only records
/// its access time. That time is honored lazily when the entry reaches the tail, where
/// it is moved back to the position its last access earns instead of being evicted.
/// A single thread therefore sees exact LRU order. Under concurrent reads an access
/// racing with the eviction of its entry can be lost.
///
/// In fixed mode a `put` evicts until the cache is back within capacity. An eviction
/// that keeps losing races gives up, and the excess is reclaimed by the next `put`.
///
/// # Type Parameters
///
/// * `K` - The key type. Must be `Clone`; the recency list keeps its own copy.
/// * `V` - The value type. Must be `Clone`; lookups return copies.
pub struct MoanaLruCache<K, V> {
    /// Per-bucket locked chains; the outer lock is taken for writing only to resize or clear
    table: RwLock<Buckets<K, V>>,

    /// Recency list, most recent first
    recency: RwLock<RecencyList<K, V>>,

    hasher: KeyHasher<K>,
    mode: CapacityMode,
    capacity: usize,
    load_factor: f64,
    count: AtomicUsize,
    clock: AtomicU64,
    evictions: AtomicU64,
}

impl<K: Hash + Eq + Clone, V: Clone> MoanaLruCache<K, V> {
    /// Creates an empty cache using the comparer selected by `config.hashing`.
    ///
    /// # Errors
    ///
    /// [`TableError::InvalidArgument`](crate::error::TableError::InvalidArgument) if the
    /// configuration is invalid.
    pub fn new(config: TableConfig) -> TableResult<Self> {
        config.validate()?;
        let hasher = KeyHasher::from_policy(&config.hashing);
        Ok(Self::build(config, hasher))
    }
}

impl<K: Clone, V: Clone> MoanaLruCache<K, V> {
    /// Creates an empty cache using an explicit comparer.
    pub fn with_comparer(
        config: TableConfig,
        comparer: Arc<dyn KeyComparer<K>>,
    ) -> TableResult<Self> {
        config.validate()?;
        let hasher = KeyHasher::with_comparer(&config.hashing, comparer);
        Ok(Self::build(config, hasher))
    }

    fn build(config: TableConfig, hasher: KeyHasher<K>) -> Self {
        let bucket_count = chained_bucket_count(config.capacity, config.load_factor);
        let reserve = match config.mode {
            CapacityMode::Fixed => config.capacity,
            CapacityMode::Dynamic => config.capacity.min(1 << 16),
        };
        Self {
            table: RwLock::new(empty_buckets(bucket_count)),
            recency: RwLock::new(RecencyList::with_capacity(reserve)),
            hasher,
            mode: config.mode,
            capacity: config.capacity,
            load_factor: config.load_factor,
            count: AtomicUsize::new(0),
            clock: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Position of `key` in `entries` and the number of entries compared.
    ///
    /// Callers report the count to the hasher once the bucket lock is released, so a
    /// collision callback may use the cache.
    fn locate(
        &self,
        entries: &[BucketEntry<K, V>],
        key: &K,
        hash: u32,
    ) -> (Option<usize>, usize) {
        let mut visited = 0;
        let found = entries.iter().position(|entry| {
            visited += 1;
            entry.hash == hash && self.hasher.equals(&entry.key, key)
        });
        (found, visited)
    }

    /// Runs `read` against the entry for `key` with its bucket locked.
    fn with_entry<R>(
        &self,
        key: &K,
        read: impl FnOnce(&mut BucketEntry<K, V>) -> R,
    ) -> Option<R> {
        let hash = self.hasher.hash(key);
        let (found, probes) = {
            let table = self.table.read();
            let mut bucket = table[bucket_of(hash, table.len())].lock();
            let (pos, probes) = self.locate(&bucket, key, hash);
            (pos.map(|pos| read(&mut bucket[pos])), probes)
        };
        self.hasher.record_probes(probes);
        found
    }

    /// Returns a copy of the value for `key` and records the access.
    pub fn get(&self, key: &K) -> Option<V> {
        self.with_entry(key, |entry| {
            entry.last_access = self.tick();
            entry.value.clone()
        })
    }

    /// Returns a copy of the value for `key` without affecting recency.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.with_entry(key, |entry| entry.value.clone())
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.with_entry(key, |_| ()).is_some()
    }

    /// Inserts or updates `key` and makes it the most recently used entry.
    ///
    /// Returns the previous value when the key was already present. In fixed mode,
    /// inserting a new key into a full cache evicts the least recently used entry.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let hash = self.hasher.hash(&key);
        // counters change under the table lock so that `clear` never interleaves
        let (outcome, probes) = {
            let table = self.table.read();
            let mut bucket = table[bucket_of(hash, table.len())].lock();
            let stamp = self.tick();
            let (found, probes) = self.locate(&bucket, &key, hash);
            let outcome = match found {
                Some(pos) => {
                    let entry = &mut bucket[pos];
                    let previous = mem::replace(&mut entry.value, value.clone());
                    entry.stamp = stamp;
                    entry.last_access = stamp;
                    let node = entry.node;
                    self.recency.write().promote(node, stamp, Some(value));
                    PutOutcome::Updated(previous)
                }
                None => {
                    let node = self.recency.write().push_front(RecencyNode::new(
                        key.clone(),
                        value.clone(),
                        hash,
                        stamp,
                    ));
                    bucket.push(BucketEntry {
                        key,
                        value,
                        hash,
                        node,
                        stamp,
                        last_access: stamp,
                    });
                    PutOutcome::Inserted {
                        previous_count: self.count.fetch_add(1, Ordering::AcqRel),
                    }
                }
            };
            (outcome, probes)
        };
        self.hasher.record_probes(probes);

        let previous_count = match outcome {
            PutOutcome::Updated(previous) => return Some(previous),
            PutOutcome::Inserted { previous_count } => previous_count,
        };
        match self.mode {
            CapacityMode::Fixed if previous_count >= self.capacity => {
                while self.len() > self.capacity && self.evict_one() {}
            }
            CapacityMode::Fixed => {}
            CapacityMode::Dynamic => self.grow_if_needed(),
        }
        None
    }

    /// Evicts the least recently used entry. Returns `false` if nothing was evicted.
    ///
    /// A tail entry read since it was stamped is not a victim: it is restamped with its
    /// access time and moved to the matching place in the list.
    fn evict_one(&self) -> bool {
        let attempts = self.count.load(Ordering::Acquire).saturating_mul(2) + 8;
        for _ in 0..attempts {
            let victim = self.recency.read().victim();
            let Some(Victim { node, hash, stamp }) = victim else {
                return false;
            };

            let table = self.table.read();
            let mut bucket = table[bucket_of(hash, table.len())].lock();
            let Some(pos) = bucket
                .iter()
                .position(|entry| entry.node == node && entry.stamp == stamp)
            else {
                // promoted or removed since the tail was read
                continue;
            };

            let last_access = bucket[pos].last_access;
            if last_access > stamp {
                bucket[pos].stamp = last_access;
                self.recency.write().reposition(node, last_access);
                continue;
            }

            bucket.swap_remove(pos);
            self.recency.write().remove(node);
            self.count.fetch_sub(1, Ordering::AcqRel);
            drop(bucket);
            drop(table);

            self.evictions.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(node, stamp, "Moana evicted least recently used entry");
            return true;
        }
        tracing::warn!(attempts, "Moana eviction gave up; victim kept changing");
        false
    }

    fn grow_if_needed(&self) {
        let len = self.count.load(Ordering::Acquire);
        if len as f64 <= self.table.read().len() as f64 * self.load_factor {
            return;
        }

        let mut table = self.table.write();
        let buckets = table.len();
        if len as f64 <= buckets as f64 * self.load_factor {
            return;
        }
        let grown = next_prime(buckets.saturating_mul(2));
        let mut fresh: Vec<Vec<BucketEntry<K, V>>> = (0..grown).map(|_| Vec::new()).collect();
        for bucket in table.iter_mut() {
            for entry in bucket.get_mut().drain(..) {
                fresh[bucket_of(entry.hash, grown)].push(entry);
            }
        }
        *table = fresh.into_iter().map(Mutex::new).collect();
        tracing::debug!(from = buckets, to = grown, "Moana buckets grown");
    }

    /// Removes `key`, returning its value.
    pub fn remove(&self, key: &K) -> Option<V> {
        let hash = self.hasher.hash(key);
        let (removed, probes) = {
            let table = self.table.read();
            let mut bucket = table[bucket_of(hash, table.len())].lock();
            let (found, probes) = self.locate(&bucket, key, hash);
            let removed = found.map(|pos| {
                let entry = bucket.swap_remove(pos);
                self.recency.write().remove(entry.node);
                self.count.fetch_sub(1, Ordering::AcqRel);
                entry.value
            });
            (removed, probes)
        };
        self.hasher.record_probes(probes);
        removed
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut table = self.table.write();
        let mut recency = self.recency.write();
        for bucket in table.iter_mut() {
            bucket.get_mut().clear();
        }
        recency.clear();
        self.count.store(0, Ordering::Release);
    }

    /// Entries from most to least recently promoted, as of one list read lock.
    pub fn snapshot(&self) -> Vec<(K, V)> {
        self.recency
            .read()
            .iter()
            .map(|node| (node.key.clone(), node.value.clone()))
            .collect()
    }

    /// Keys from most to least recently promoted.
    pub fn keys(&self) -> Vec<K> {
        self.recency
            .read()
            .iter()
            .map(|node| node.key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum entries in fixed mode, initial sizing otherwise.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn mode(&self) -> CapacityMode {
        self.mode
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    pub fn comparer_name(&self) -> &'static str {
        self.hasher.comparer_name()
    }

    /// Checks that every bucket entry has a matching recency node and that the
    /// counters agree. Blocks all other operations while it runs.
    pub fn consistency_check(&self) -> bool {
        let mut table = self.table.write();
        let recency = self.recency.read();

        let mut entries = 0;
        for bucket in table.iter_mut() {
            for entry in bucket.get_mut().iter() {
                entries += 1;
                let matches = recency.get(entry.node).is_some_and(|node| {
                    node.stamp == entry.stamp
                        && node.hash == entry.hash
                        && self.hasher.equals(&node.key, &entry.key)
                });
                if !matches {
                    return false;
                }
            }
        }
        entries == recency.len()
            && entries == recency.iter().count()
            && entries == self.count.load(Ordering::Acquire)
    }
}

impl<K, V> fmt::Debug for MoanaLruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoanaLruCache")
            .field("len", &self.count.load(Ordering::Relaxed))
            .field("capacity", &self.capacity)
            .field("mode", &self.mode)
            .field("evictions", &self.evictions.load(Ordering::Relaxed))
            .field("hasher", &self.hasher)
            .finish()
    }
}

#[inline]
fn bucket_of(hash: u32, bucket_count: usize) -> usize {
    hash as usize % bucket_count
}

fn empty_buckets<K, V>(bucket_count: usize) -> Buckets<K, V> {
    (0..bucket_count.max(1)).map(|_| Mutex::new(Vec::new())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> MoanaLruCache<&'static str, u32> {
        MoanaLruCache::new(TableConfig::fixed(capacity)).unwrap()
    }

    #[test]
    fn test_read_protects_from_eviction() {
        let lru = cache(2);
        lru.put("A", 1);
        lru.put("B", 2);
        assert_eq!(lru.get(&"A"), Some(1));
        lru.put("C", 3);

        assert!(lru.contains_key(&"A"));
        assert!(!lru.contains_key(&"B"));
        assert!(lru.contains_key(&"C"));
        assert_eq!(lru.len(), 2);
        assert_eq!(lru.evictions(), 1);
        assert!(lru.consistency_check());
    }

    #[test]
    fn test_reads_before_an_insert_rank_below_it() {
        let lru = cache(3);
        lru.put("A", 1);
        lru.put("B", 2);
        lru.put("C", 3);
        lru.get(&"B");
        lru.get(&"A");
        lru.put("D", 4);
        assert_eq!(lru.keys(), vec!["D", "A", "B"]);

        lru.put("E", 5);
        assert_eq!(lru.keys(), vec!["E", "D", "A"]);
        assert_eq!(lru.evictions(), 2);
        assert!(lru.consistency_check());
    }

    #[test]
    fn test_collision_callback_may_use_the_cache() {
        use crate::hashing::{HashingPolicy, KeyComparer};
        use std::sync::OnceLock;

        struct SameBucket;
        impl KeyComparer<u32> for SameBucket {
            fn hash(&self, _key: &u32) -> u64 {
                7
            }
            fn equals(&self, a: &u32, b: &u32) -> bool {
                a == b
            }
            fn name(&self) -> &'static str {
                "same-bucket"
            }
        }

        let shared: Arc<OnceLock<MoanaLruCache<u32, u32>>> = Arc::new(OnceLock::new());
        let seen = Arc::clone(&shared);
        let policy = HashingPolicy::new()
            .with_collision_threshold(1)
            .with_collision_callback(move |_| {
                if let Some(cache) = seen.get() {
                    cache.peek(&0);
                }
            });
        let lru = MoanaLruCache::with_comparer(
            TableConfig::fixed(8).with_hashing(policy),
            Arc::new(SameBucket),
        )
        .unwrap();
        assert!(shared.set(lru).is_ok());

        let lru = shared.get().unwrap();
        for i in 0..4 {
            lru.put(i, i);
        }
        assert_eq!(lru.get(&3), Some(3));
        assert_eq!(lru.len(), 4);
    }

    #[test]
    fn test_peek_does_not_protect() {
        let lru = cache(2);
        lru.put("A", 1);
        lru.put("B", 2);
        assert_eq!(lru.peek(&"A"), Some(1));
        lru.put("C", 3);

        assert!(!lru.contains_key(&"A"));
        assert!(lru.contains_key(&"B"));
    }

    #[test]
    fn test_update_promotes() {
        let lru = cache(2);
        lru.put("A", 1);
        lru.put("B", 2);
        assert_eq!(lru.put("A", 10), Some(1));
        assert_eq!(lru.keys(), vec!["A", "B"]);

        lru.put("C", 3);
        assert_eq!(lru.snapshot(), vec![("C", 3), ("A", 10)]);
        assert!(lru.consistency_check());
    }

    #[test]
    fn test_remove_and_clear() {
        let lru = cache(4);
        lru.put("A", 1);
        lru.put("B", 2);
        assert_eq!(lru.remove(&"A"), Some(1));
        assert_eq!(lru.remove(&"A"), None);
        assert_eq!(lru.len(), 1);
        assert!(lru.consistency_check());

        lru.clear();
        lru.clear();
        assert!(lru.is_empty());
        assert!(lru.snapshot().is_empty());
        assert!(lru.consistency_check());
    }

    #[test]
    fn test_capacity_one() {
        let lru = cache(1);
        for (i, key) in ["a", "b", "c"].into_iter().enumerate() {
            lru.put(key, i as u32);
        }
        assert_eq!(lru.snapshot(), vec![("c", 2)]);
        assert_eq!(lru.evictions(), 2);
    }

    #[test]
    fn test_dynamic_mode_grows_without_evicting() {
        let lru = MoanaLruCache::new(TableConfig::new().with_capacity(2)).unwrap();
        for i in 0..500u32 {
            lru.put(i, i);
        }
        assert_eq!(lru.len(), 500);
        assert_eq!(lru.evictions(), 0);
        assert!((0..500).all(|i| lru.get(&i) == Some(i)));
        assert!(lru.consistency_check());
    }
}
