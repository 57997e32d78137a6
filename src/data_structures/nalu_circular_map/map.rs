// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Implementation of the Nalu Circular Map.

use std::hash::Hash;
use std::mem;
use std::sync::Arc;

use crate::data_structures::config::{CapacityMode, TableConfig};
use crate::data_structures::nalu_circular_map::node::RingNode;
use crate::data_structures::table::{ChainIndex, Cursor, Version};
use crate::error::{TableError, TableResult};
use crate::hashing::{KeyComparer, KeyHasher};
use crate::sizing::chained_bucket_count;

/// Occupancy summary returned by [`NaluCircularMap::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RingStats {
    /// Live entries
    pub len: usize,
    /// Ring slots
    pub capacity: usize,
    /// Empty slots between the oldest and newest entry, left behind by removals
    pub holes: usize,
    /// Stamp of the oldest entry, `0` when empty
    pub oldest_stamp: u64,
    /// Stamp of the newest entry, `0` when empty
    pub newest_stamp: u64,
}

/// A hash map whose entries live in a ring of slots ordered by age.
///
/// `head` is the oldest occupied slot and `tail` the newest. In
/// [`CapacityMode::Fixed`] inserting a new key into a full ring evicts the entry at
/// `head`; in [`CapacityMode::Dynamic`] the ring doubles instead. Updating an existing
/// key refreshes its value and stamp but keeps its ring position.
///
/// # Type Parameters
///
/// * `K` - The key type. Hashing and equality come from the map's comparer.
/// * `V` - The value type.
#[derive(Debug)]
pub struct NaluCircularMap<K, V> {
    /// Ring slots
    ring: Vec<Option<RingNode<K, V>>>,

    /// Chained hash index over ring positions
    index: ChainIndex,

    /// Resolved comparer and collision monitor
    hasher: KeyHasher<K>,

    load_factor: f64,
    mode: CapacityMode,

    /// Oldest occupied slot; `0` when empty
    head: usize,

    /// Newest occupied slot; `0` when empty
    tail: usize,

    len: usize,

    /// Logical clock for entry stamps
    clock: u64,

    evictions: u64,
    version: Version,
}

impl<K: Hash + Eq, V> NaluCircularMap<K, V> {
    /// Creates an empty map using the comparer selected by `config.hashing`.
    ///
    /// # Errors
    ///
    /// [`TableError::InvalidArgument`] if the configuration is invalid.
    pub fn new(config: TableConfig) -> TableResult<Self> {
        config.validate()?;
        let hasher = KeyHasher::from_policy(&config.hashing);
        Ok(Self::build(config, hasher))
    }
}

impl<K, V> NaluCircularMap<K, V> {
    /// Creates an empty map using an explicit comparer.
    pub fn with_comparer(
        config: TableConfig,
        comparer: Arc<dyn KeyComparer<K>>,
    ) -> TableResult<Self> {
        config.validate()?;
        let hasher = KeyHasher::with_comparer(&config.hashing, comparer);
        Ok(Self::build(config, hasher))
    }

    fn build(config: TableConfig, hasher: KeyHasher<K>) -> Self {
        Self {
            ring: empty_ring(config.capacity),
            index: ChainIndex::with_buckets(chained_bucket_count(
                config.capacity,
                config.load_factor,
            )),
            hasher,
            load_factor: config.load_factor,
            mode: config.mode,
            head: 0,
            tail: 0,
            len: 0,
            clock: 0,
            evictions: 0,
            version: Version::default(),
        }
    }

    fn find(&self, key: &K, hash: u32) -> Option<usize> {
        let (found, visited) = self
            .index
            .find(&self.ring, hash, |node| self.hasher.equals(&node.key, key));
        self.hasher.record_probes(visited);
        found
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Inserts or updates `key`.
    ///
    /// Returns the previous value when the key was already present.
    ///
    /// # Errors
    ///
    /// [`TableError::CapacityExhausted`] if a dynamic ring cannot grow any further.
    pub fn insert(&mut self, key: K, value: V) -> TableResult<Option<V>> {
        let hash = self.hasher.hash(&key);
        if let Some(idx) = self.find(&key, hash) {
            let stamp = self.tick();
            self.version.bump();
            return Ok(self.ring[idx].as_mut().map(|node| {
                node.stamp = stamp;
                mem::replace(&mut node.value, value)
            }));
        }

        if self.len == self.ring.len() {
            match self.mode {
                CapacityMode::Fixed => {
                    self.evict_oldest();
                }
                CapacityMode::Dynamic => self.grow()?,
            }
        }

        let idx = self.claim_slot()?;
        let stamp = self.tick();
        self.ring[idx] = Some(RingNode {
            key,
            value,
            hash,
            chain_next: None,
            stamp,
        });
        self.index.link(&mut self.ring, idx);
        self.tail = idx;
        self.len += 1;
        self.version.bump();
        Ok(None)
    }

    /// Picks the slot just after `tail`, repacking the ring when that slot is `head`.
    fn claim_slot(&mut self) -> TableResult<usize> {
        let capacity = self.ring.len();
        if self.len == 0 {
            self.head = 0;
            return Ok(0);
        }
        if self.len >= capacity {
            return Err(TableError::CapacityExhausted { capacity });
        }
        let next = (self.tail + 1) % capacity;
        if next != self.head {
            return Ok(next);
        }
        // wrapped onto head with holes behind it
        self.repack(capacity);
        Ok(self.len)
    }

    /// Moves every live entry to slots `0..len` in age order and rebuilds the index.
    fn repack(&mut self, capacity: usize) {
        let old_capacity = self.ring.len();
        let mut ring = empty_ring(capacity);
        let mut packed = 0;
        for offset in 0..old_capacity {
            let pos = (self.head + offset) % old_capacity;
            if let Some(node) = self.ring[pos].take() {
                ring[packed] = Some(node);
                packed += 1;
            }
        }
        self.ring = ring;
        self.head = 0;
        self.tail = packed.saturating_sub(1);
        let buckets = if capacity == old_capacity {
            self.index.bucket_count()
        } else {
            chained_bucket_count(capacity, self.load_factor)
        };
        self.index.rebuild(buckets, &mut self.ring);
    }

    fn grow(&mut self) -> TableResult<()> {
        let capacity = self.ring.len();
        let grown = capacity
            .checked_mul(2)
            .ok_or(TableError::CapacityExhausted { capacity })?;
        self.repack(grown);
        tracing::debug!(from = capacity, to = grown, "Nalu ring grown");
        Ok(())
    }

    fn next_occupied(&self, from: usize) -> Option<usize> {
        let capacity = self.ring.len();
        (1..capacity)
            .map(|offset| (from + offset) % capacity)
            .find(|&pos| self.ring[pos].is_some())
    }

    fn prev_occupied(&self, from: usize) -> Option<usize> {
        let capacity = self.ring.len();
        (1..capacity)
            .map(|offset| (from + capacity - offset) % capacity)
            .find(|&pos| self.ring[pos].is_some())
    }

    fn remove_at(&mut self, idx: usize) -> Option<RingNode<K, V>> {
        self.index.unlink(&mut self.ring, idx);
        let node = self.ring.get_mut(idx)?.take()?;
        self.len -= 1;
        if self.len == 0 {
            self.head = 0;
            self.tail = 0;
        } else if idx == self.head {
            self.head = self.next_occupied(idx).unwrap_or(self.tail);
        } else if idx == self.tail {
            self.tail = self.prev_occupied(idx).unwrap_or(self.head);
        }
        self.version.bump();
        Some(node)
    }

    fn evict_oldest(&mut self) -> Option<RingNode<K, V>> {
        let slot = self.head;
        let node = self.remove_at(slot)?;
        self.evictions += 1;
        tracing::trace!(slot, stamp = node.stamp, "Nalu evicted oldest entry");
        Some(node)
    }

    /// Returns the value for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        let idx = self.find(key, self.hasher.hash(key))?;
        self.ring[idx].as_ref().map(|node| &node.value)
    }

    /// Returns a mutable reference to the value for `key`. Does not refresh its stamp.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.find(key, self.hasher.hash(key))?;
        self.ring[idx].as_mut().map(|node| &mut node.value)
    }

    /// Like [`get`](Self::get) but reports a miss as [`TableError::KeyNotFound`].
    pub fn require(&self, key: &K) -> TableResult<&V> {
        self.get(key).ok_or(TableError::KeyNotFound)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key, self.hasher.hash(key)).is_some()
    }

    /// Stamp of the last insert or update of `key`.
    pub fn timestamp(&self, key: &K) -> Option<u64> {
        let idx = self.find(key, self.hasher.hash(key))?;
        self.ring[idx].as_ref().map(|node| node.stamp)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.find(key, self.hasher.hash(key))?;
        self.remove_at(idx).map(|node| node.value)
    }

    /// The oldest entry.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`] if the map is empty.
    pub fn oldest(&self) -> TableResult<(&K, &V)> {
        self.entry_at(self.head)
    }

    /// The newest entry.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`] if the map is empty.
    pub fn newest(&self) -> TableResult<(&K, &V)> {
        self.entry_at(self.tail)
    }

    fn entry_at(&self, idx: usize) -> TableResult<(&K, &V)> {
        if self.len == 0 {
            return Err(TableError::Empty);
        }
        self.ring[idx]
            .as_ref()
            .map(|node| (&node.key, &node.value))
            .ok_or(TableError::Empty)
    }

    /// Removes and returns the oldest entry.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`] if the map is empty.
    pub fn pop_oldest(&mut self) -> TableResult<(K, V)> {
        if self.len == 0 {
            return Err(TableError::Empty);
        }
        self.remove_at(self.head)
            .map(|node| (node.key, node.value))
            .ok_or(TableError::Empty)
    }

    /// Up to `n` of the newest entries, oldest first.
    pub fn recent_window(&self, n: usize) -> Vec<(&K, &V)> {
        let capacity = self.ring.len();
        let wanted = n.min(self.len);
        let mut window = Vec::with_capacity(wanted);
        for offset in 0..capacity {
            if window.len() == wanted {
                break;
            }
            let pos = (self.tail + capacity - offset) % capacity;
            if let Some(node) = &self.ring[pos] {
                window.push((&node.key, &node.value));
            }
        }
        window.reverse();
        window
    }

    /// Drops every entry. The ring keeps its current size.
    pub fn clear(&mut self) {
        self.ring.iter_mut().for_each(|slot| *slot = None);
        self.index.clear();
        self.head = 0;
        self.tail = 0;
        self.len = 0;
        self.version.bump();
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current number of ring slots.
    pub fn capacity(&self) -> usize {
        self.ring.len()
    }

    pub fn mode(&self) -> CapacityMode {
        self.mode
    }

    /// Entries evicted to make room since construction.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Name of the active key comparer.
    pub fn comparer_name(&self) -> &'static str {
        self.hasher.comparer_name()
    }

    pub fn stats(&self) -> RingStats {
        let capacity = self.ring.len();
        if self.len == 0 {
            return RingStats {
                capacity,
                ..RingStats::default()
            };
        }
        let span = (self.tail + capacity - self.head) % capacity + 1;
        let stamp_at = |idx: usize| self.ring[idx].as_ref().map_or(0, |node| node.stamp);
        RingStats {
            len: self.len,
            capacity,
            holes: span - self.len,
            oldest_stamp: stamp_at(self.head),
            newest_stamp: stamp_at(self.tail),
        }
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            ring: &self.ring,
            pos: self.head,
            remaining: self.len,
        }
    }

    /// Detached cursor positioned at the oldest entry.
    pub fn cursor(&self) -> Cursor {
        let start = (self.len > 0).then_some(self.head);
        Cursor::new(self.version, start, self.len)
    }

    /// Yields the next entry for `cursor`, oldest first.
    ///
    /// # Errors
    ///
    /// [`TableError::ConcurrentModification`] if the map changed since the cursor was
    /// created.
    pub fn advance(&self, cursor: &mut Cursor) -> TableResult<Option<(K, V)>>
    where
        K: Clone,
        V: Clone,
    {
        cursor.check(self.version)?;
        let Some(start) = cursor.position().filter(|_| !cursor.is_finished()) else {
            return Ok(None);
        };
        let capacity = self.ring.len();
        let found = (0..capacity)
            .map(|offset| (start + offset) % capacity)
            .find_map(|pos| self.ring[pos].as_ref().map(|node| (pos, node)));
        match found {
            Some((pos, node)) => {
                cursor.step(Some((pos + 1) % capacity));
                Ok(Some((node.key.clone(), node.value.clone())))
            }
            None => {
                cursor.finish();
                Ok(None)
            }
        }
    }
}

/// Oldest-to-newest iterator over a [`NaluCircularMap`].
pub struct Iter<'a, K, V> {
    ring: &'a [Option<RingNode<K, V>>],
    pos: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 {
            let slot = &self.ring[self.pos];
            self.pos = (self.pos + 1) % self.ring.len();
            if let Some(node) = slot {
                self.remaining -= 1;
                return Some((&node.key, &node.value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a NaluCircularMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn empty_ring<K, V>(capacity: usize) -> Vec<Option<RingNode<K, V>>> {
    (0..capacity).map(|_| None).collect()
}
