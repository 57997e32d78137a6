// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Implementation of the Ohana Multi Map.

use std::hash::Hash;
use std::sync::Arc;

use crate::data_structures::config::{CapacityMode, TableConfig};
use crate::data_structures::table::{Cursor, End, LinkedIter, LinkedTable};
use crate::error::{TableError, TableResult};
use crate::hashing::{KeyComparer, KeyHasher};

/// A hash map from each key to an ordered list of values.
#[derive(Debug)]
pub struct OhanaMultiMap<K, V> {
    table: LinkedTable<K, Vec<V>>,

    /// Values across all keys
    values: usize,
}

impl<K: Hash + Eq, V> OhanaMultiMap<K, V> {
    /// Creates an empty map using the comparer selected by `config.hashing`.
    ///
    /// # Errors
    ///
    /// [`TableError::InvalidArgument`] if the configuration is invalid.
    pub fn new(config: TableConfig) -> TableResult<Self> {
        config.validate()?;
        let hasher = KeyHasher::from_policy(&config.hashing);
        Ok(Self {
            table: LinkedTable::new(&config, hasher),
            values: 0,
        })
    }
}

impl<K, V> OhanaMultiMap<K, V> {
    /// Creates an empty map using an explicit comparer.
    pub fn with_comparer(
        config: TableConfig,
        comparer: Arc<dyn KeyComparer<K>>,
    ) -> TableResult<Self> {
        config.validate()?;
        let hasher = KeyHasher::with_comparer(&config.hashing, comparer);
        Ok(Self {
            table: LinkedTable::new(&config, hasher),
            values: 0,
        })
    }

    /// Appends `value` to the values of `key`, creating the key if needed.
    pub fn insert(&mut self, key: K, value: V) {
        let hash = self.table.hash(&key);
        if let Some(idx) = self.table.find(&key, hash) {
            if let Some(values) = self.table.value_mut(idx) {
                values.push(value);
                self.values += 1;
            }
            self.table.touch();
            return;
        }

        if self.table.is_full() {
            if let Some(evicted) = self.table.evict(End::Front) {
                self.values -= evicted.value.len();
            }
        }
        self.table.attach(key, vec![value], hash, End::Back);
        self.values += 1;
    }

    /// All values of `key` in insertion order.
    pub fn get(&self, key: &K) -> Option<&[V]> {
        let idx = self.table.lookup(key)?;
        self.table.node(idx).map(|node| node.value.as_slice())
    }

    /// Like [`get`](Self::get) but reports a miss as [`TableError::KeyNotFound`].
    pub fn require(&self, key: &K) -> TableResult<&[V]> {
        self.get(key).ok_or(TableError::KeyNotFound)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.table.lookup(key).is_some()
    }

    /// Whether any key holds `value`.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.table.iter().any(|node| node.value.contains(value))
    }

    /// Removes `key` with all of its values.
    pub fn remove(&mut self, key: &K) -> Option<Vec<V>> {
        let idx = self.table.lookup(key)?;
        let node = self.table.detach(idx)?;
        self.values -= node.value.len();
        Some(node.value)
    }

    /// Removes the first value of `key` equal to `value`. Drops the key when its last
    /// value goes. Returns whether a value was removed.
    pub fn remove_value(&mut self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        let Some(idx) = self.table.lookup(key) else {
            return false;
        };
        let Some(values) = self.table.value_mut(idx) else {
            return false;
        };
        let Some(pos) = values.iter().position(|v| v == value) else {
            return false;
        };
        values.remove(pos);
        let emptied = values.is_empty();
        self.values -= 1;
        if emptied {
            self.table.detach(idx);
        } else {
            self.table.touch();
        }
        true
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Number of values across all keys.
    pub fn value_count(&self) -> usize {
        self.values
    }

    /// Initial key capacity, or the maximum in fixed mode.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn mode(&self) -> CapacityMode {
        self.table.mode()
    }

    /// Keys evicted to make room since construction.
    pub fn evictions(&self) -> u64 {
        self.table.evictions()
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.values = 0;
    }

    /// Keys in first-insertion order, each with its values.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Every `(key, value)` pair, grouped by key.
    pub fn iter_pairs(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (key, value)))
    }

    /// Detached cursor positioned at the oldest key.
    pub fn cursor(&self) -> Cursor {
        self.table.cursor()
    }

    /// Yields the next key and a copy of its values.
    ///
    /// # Errors
    ///
    /// [`TableError::ConcurrentModification`] if the map changed since the cursor was
    /// created.
    pub fn advance(&self, cursor: &mut Cursor) -> TableResult<Option<(K, Vec<V>)>>
    where
        K: Clone,
        V: Clone,
    {
        self.table
            .advance(cursor, |node| (node.key.clone(), node.value.clone()))
    }
}

/// Iterator over keys and their value slices.
pub struct Iter<'a, K, V> {
    inner: LinkedIter<'a, K, Vec<V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a [V]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|node| (&node.key, node.value.as_slice()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a OhanaMultiMap<K, V> {
    type Item = (&'a K, &'a [V]);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
