// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Implementation of the Puka Probe Map.

use std::cell::Cell;
use std::hash::Hash;
use std::mem;
use std::sync::Arc;

use crate::data_structures::kona_bloom_filter::{KonaBloomFilter, KonaBloomFilterConfig};
use crate::data_structures::puka_probe_map::config::PukaProbeMapConfig;
use crate::data_structures::table::{Cursor, Version};
use crate::error::{TableError, TableResult};
use crate::hashing::{KeyComparer, KeyHasher};
use crate::sizing::{next_power_of_two, MAX_POWER_OF_TWO};

/// Removals between shrink/rehash checks.
const MAINTENANCE_INTERVAL: usize = 16;

/// Live fraction below which the table shrinks.
const SHRINK_LOAD: f64 = 0.10;

/// Tombstone fraction above which the table is rehashed in place.
const REHASH_TOMBSTONES: f64 = 0.25;

struct ProbeEntry<K, V> {
    hash: u32,
    key: K,
    value: V,
}

enum Slot<K, V> {
    Empty,
    Occupied(ProbeEntry<K, V>),
    Deleted,
}

impl<K, V> Slot<K, V> {
    fn entry(&self) -> Option<&ProbeEntry<K, V>> {
        match self {
            Slot::Occupied(entry) => Some(entry),
            _ => None,
        }
    }
}

/// Counters reported by [`PukaProbeMap::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeStats {
    /// Slot count
    pub capacity: usize,
    /// Occupied slots
    pub live: usize,
    /// Deleted slots awaiting reuse or rehash
    pub tombstones: usize,
    /// Lookups answered by the Bloom filter alone
    pub filtered_lookups: u64,
    /// Capacity doublings
    pub resizes: u64,
    /// Same-size rebuilds that cleared tombstones
    pub rehashes: u64,
    /// Capacity reductions
    pub shrinks: u64,
    /// Longest distance of any entry from its home slot
    pub max_displacement: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rebuild {
    Grow,
    Rehash,
    Shrink,
}

/// An open-addressed hash map with linear probing, tombstones and a Bloom pre-filter.
///
/// Every inserted key is registered with a [`KonaBloomFilter`]; a lookup the filter
/// rejects returns immediately without touching the slot array. Removals leave
/// tombstones, which are reused by later inserts and cleared by periodic rehashing.
///
/// The map is `!Sync`: lookups update interior statistics.
pub struct PukaProbeMap<K, V> {
    slots: Vec<Slot<K, V>>,
    filter: KonaBloomFilter,
    hasher: KeyHasher<K>,
    config: PukaProbeMapConfig,

    /// Capacity never shrunk below
    min_capacity: usize,
    live: usize,
    tombstones: usize,
    removals: usize,
    max_displacement: usize,

    filtered_lookups: Cell<u64>,
    resizes: u64,
    rehashes: u64,
    shrinks: u64,

    version: Version,
}

impl<K: Hash + Eq, V> PukaProbeMap<K, V> {
    /// Creates an empty map using the comparer selected by `config.hashing`.
    ///
    /// # Errors
    ///
    /// [`TableError::InvalidArgument`] if the configuration is invalid.
    pub fn new(config: PukaProbeMapConfig) -> TableResult<Self> {
        config.validate()?;
        let hasher = KeyHasher::from_policy(&config.hashing);
        Self::build(config, hasher)
    }
}

impl<K, V> PukaProbeMap<K, V> {
    /// Creates an empty map using an explicit comparer.
    pub fn with_comparer(
        config: PukaProbeMapConfig,
        comparer: Arc<dyn KeyComparer<K>>,
    ) -> TableResult<Self> {
        config.validate()?;
        let hasher = KeyHasher::with_comparer(&config.hashing, comparer);
        Self::build(config, hasher)
    }

    fn build(config: PukaProbeMapConfig, hasher: KeyHasher<K>) -> TableResult<Self> {
        let capacity = next_power_of_two(config.initial_capacity)?;
        let filter = KonaBloomFilter::with_config(filter_config(&config, capacity))?;
        Ok(Self {
            slots: empty_slots(capacity),
            filter,
            hasher,
            config,
            min_capacity: capacity,
            live: 0,
            tombstones: 0,
            removals: 0,
            max_displacement: 0,
            filtered_lookups: Cell::new(0),
            resizes: 0,
            rehashes: 0,
            shrinks: 0,
            version: Version::default(),
        })
    }

    #[inline]
    fn mask(&self) -> usize {
        self.slots.len() - 1
    }

    fn find(&self, key: &K, hash: u32) -> Option<usize> {
        if !self.filter.contains_hash(u64::from(hash)) {
            self.filtered_lookups.set(self.filtered_lookups.get() + 1);
            return None;
        }

        let mask = self.mask();
        let home = hash as usize & mask;
        let bound = self.max_displacement.min(mask);
        let mut visited = 0;
        let mut found = None;
        for distance in 0..=bound {
            let pos = (home + distance) & mask;
            visited += 1;
            match &self.slots[pos] {
                Slot::Empty => break,
                Slot::Deleted => {}
                Slot::Occupied(entry) => {
                    if entry.hash == hash && self.hasher.equals(&entry.key, key) {
                        found = Some(pos);
                        break;
                    }
                }
            }
        }
        self.hasher.record_probes(visited);
        found
    }

    /// First free slot (empty or tombstone) on the probe path of `hash`, with its distance.
    fn free_slot(&self, hash: u32, bound: usize) -> Option<(usize, usize)> {
        let mask = self.mask();
        let home = hash as usize & mask;
        (0..=bound.min(mask))
            .map(|distance| ((home + distance) & mask, distance))
            .find(|&(pos, _)| !matches!(self.slots[pos], Slot::Occupied(_)))
    }

    fn place(&mut self, pos: usize, distance: usize, entry: ProbeEntry<K, V>) {
        if matches!(self.slots[pos], Slot::Deleted) {
            self.tombstones -= 1;
        }
        self.slots[pos] = Slot::Occupied(entry);
        self.max_displacement = self.max_displacement.max(distance);
    }

    /// Inserts or updates `key`.
    ///
    /// Returns the previous value when the key was already present.
    ///
    /// # Errors
    ///
    /// [`TableError::CapacityExhausted`] if the table would have to grow past the
    /// largest supported power of two.
    pub fn insert(&mut self, key: K, value: V) -> TableResult<Option<V>> {
        let hash = self.hasher.hash(&key);
        if let Some(pos) = self.find(&key, hash) {
            if let Slot::Occupied(entry) = &mut self.slots[pos] {
                self.version.bump();
                return Ok(Some(mem::replace(&mut entry.value, value)));
            }
        }

        self.reserve_one()?;

        let mut placement = self.free_slot(hash, self.config.max_probe_distance);
        if placement.is_none() && self.live * 4 >= self.slots.len() {
            self.rebuild(self.grown_capacity()?, Rebuild::Grow);
            placement = self.free_slot(hash, self.config.max_probe_distance);
        }
        let (pos, distance) = match placement {
            Some(found) => found,
            None => {
                let forced = self
                    .free_slot(hash, usize::MAX)
                    .ok_or(TableError::CapacityExhausted {
                        capacity: self.slots.len(),
                    })?;
                tracing::warn!(
                    distance = forced.1,
                    max_probe_distance = self.config.max_probe_distance,
                    "Puka placed entry beyond the probe distance bound"
                );
                forced
            }
        };

        self.place(pos, distance, ProbeEntry { hash, key, value });
        self.filter.insert_hash(u64::from(hash));
        self.live += 1;
        self.version.bump();
        Ok(None)
    }

    fn grown_capacity(&self) -> TableResult<usize> {
        let capacity = self.slots.len();
        capacity
            .checked_mul(2)
            .filter(|&grown| grown <= MAX_POWER_OF_TWO)
            .ok_or(TableError::CapacityExhausted { capacity })
    }

    /// Makes room for one more entry under the load factor.
    fn reserve_one(&mut self) -> TableResult<()> {
        let limit = self.slots.len() as f64 * self.config.load_factor;
        if (self.live + 1) as f64 > limit {
            self.rebuild(self.grown_capacity()?, Rebuild::Grow);
        } else if (self.live + self.tombstones + 1) as f64 > limit {
            self.rebuild(self.slots.len(), Rebuild::Rehash);
        }
        Ok(())
    }

    /// Reinserts every live entry into `capacity` fresh slots and rebuilds the filter.
    fn rebuild(&mut self, capacity: usize, reason: Rebuild) {
        let from = self.slots.len();
        let old = mem::replace(&mut self.slots, empty_slots(capacity));
        self.tombstones = 0;
        self.max_displacement = 0;

        let mut filter = match KonaBloomFilter::with_config(filter_config(&self.config, capacity)) {
            Ok(filter) => Some(filter),
            Err(error) => {
                tracing::warn!(%error, "Puka kept its previous Bloom filter");
                None
            }
        };

        for slot in old {
            if let Slot::Occupied(entry) = slot {
                if let Some(filter) = filter.as_mut() {
                    filter.insert_hash(u64::from(entry.hash));
                }
                // a fresh table always has an empty slot for every live entry
                if let Some((pos, distance)) = self.free_slot(entry.hash, usize::MAX) {
                    self.place(pos, distance, entry);
                }
            }
        }
        if let Some(filter) = filter {
            self.filter = filter;
        }

        match reason {
            Rebuild::Grow => self.resizes += 1,
            Rebuild::Rehash => self.rehashes += 1,
            Rebuild::Shrink => self.shrinks += 1,
        }
        tracing::debug!(
            from,
            to = capacity,
            live = self.live,
            reason = ?reason,
            "Puka table rebuilt"
        );
    }

    /// Removes `key`, leaving a tombstone.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let pos = self.find(key, self.hasher.hash(key))?;
        let Slot::Occupied(entry) = mem::replace(&mut self.slots[pos], Slot::Deleted) else {
            return None;
        };
        self.live -= 1;
        self.tombstones += 1;
        self.removals += 1;
        self.version.bump();

        if self.removals % MAINTENANCE_INTERVAL == 0 {
            self.maintain();
        }
        Some(entry.value)
    }

    fn maintain(&mut self) {
        let capacity = self.slots.len();
        if capacity > self.min_capacity && (self.live as f64) < capacity as f64 * SHRINK_LOAD {
            let wanted = (self.live as f64 / self.config.load_factor).ceil() as usize + 1;
            let target = next_power_of_two(wanted)
                .unwrap_or(capacity)
                .max(self.min_capacity);
            if target < capacity {
                self.rebuild(target, Rebuild::Shrink);
                return;
            }
        }
        if self.tombstones as f64 > capacity as f64 * REHASH_TOMBSTONES {
            self.rebuild(capacity, Rebuild::Rehash);
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let pos = self.find(key, self.hasher.hash(key))?;
        self.slots[pos].entry().map(|entry| &entry.value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let pos = self.find(key, self.hasher.hash(key))?;
        match &mut self.slots[pos] {
            Slot::Occupied(entry) => Some(&mut entry.value),
            _ => None,
        }
    }

    /// Like [`get`](Self::get) but reports a miss as [`TableError::KeyNotFound`].
    pub fn require(&self, key: &K) -> TableResult<&V> {
        self.get(key).ok_or(TableError::KeyNotFound)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key, self.hasher.hash(key)).is_some()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Current slot count.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn comparer_name(&self) -> &'static str {
        self.hasher.comparer_name()
    }

    /// The companion filter.
    pub fn filter(&self) -> &KonaBloomFilter {
        &self.filter
    }

    /// Drops every entry and resets the filter. Capacity is kept.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = Slot::Empty);
        self.filter.clear();
        self.live = 0;
        self.tombstones = 0;
        self.max_displacement = 0;
        self.version.bump();
    }

    pub fn stats(&self) -> ProbeStats {
        ProbeStats {
            capacity: self.slots.len(),
            live: self.live,
            tombstones: self.tombstones,
            filtered_lookups: self.filtered_lookups.get(),
            resizes: self.resizes,
            rehashes: self.rehashes,
            shrinks: self.shrinks,
            max_displacement: self.max_displacement,
        }
    }

    /// Entries in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.live,
        }
    }

    /// Detached cursor positioned at the first slot.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.version, Some(0), self.live)
    }

    /// Yields the next entry for `cursor`, in slot order.
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
        let found = self
            .slots
            .iter()
            .enumerate()
            .skip(start)
            .find_map(|(pos, slot)| slot.entry().map(|entry| (pos, entry)));
        match found {
            Some((pos, entry)) => {
                cursor.step(Some(pos + 1));
                Ok(Some((entry.key.clone(), entry.value.clone())))
            }
            None => {
                cursor.finish();
                Ok(None)
            }
        }
    }
}

impl<K, V> std::fmt::Debug for PukaProbeMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PukaProbeMap")
            .field("stats", &self.stats())
            .field("filter", &self.filter)
            .field("hasher", &self.hasher)
            .finish()
    }
}

/// Slot-order iterator over a [`PukaProbeMap`].
pub struct Iter<'a, K, V> {
    slots: std::slice::Iter<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.slots.by_ref().find_map(Slot::entry)?;
        self.remaining -= 1;
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a PukaProbeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn filter_config(config: &PukaProbeMapConfig, capacity: usize) -> KonaBloomFilterConfig {
    KonaBloomFilterConfig::new()
        .with_expected_items(capacity.saturating_mul(2))
        .with_false_positive_rate(config.false_positive_rate)
}

fn empty_slots<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    (0..capacity).map(|_| Slot::Empty).collect()
}
