// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Implementation of the Lei Linked Map.

use std::hash::Hash;
use std::mem;
use std::sync::Arc;

use crate::data_structures::config::{CapacityMode, TableConfig};
use crate::data_structures::table::{Cursor, End, LinkedIter, LinkedTable};
use crate::error::{TableError, TableResult};
use crate::hashing::{KeyComparer, KeyHasher};

/// A hash map ordered as a double-ended queue.
///
/// `insert` appends new keys at the back and updates existing keys in place;
/// `push_front`/`push_back` also move an existing key to that end.
#[derive(Debug)]
pub struct LeiLinkedMap<K, V> {
    table: LinkedTable<K, V>,
}

impl<K: Hash + Eq, V> LeiLinkedMap<K, V> {
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
        })
    }
}

impl<K, V> LeiLinkedMap<K, V> {
    /// Creates an empty map using an explicit comparer.
    pub fn with_comparer(
        config: TableConfig,
        comparer: Arc<dyn KeyComparer<K>>,
    ) -> TableResult<Self> {
        config.validate()?;
        let hasher = KeyHasher::with_comparer(&config.hashing, comparer);
        Ok(Self {
            table: LinkedTable::new(&config, hasher),
        })
    }

    fn upsert(&mut self, key: K, value: V, end: End, relocate: bool) -> Option<V> {
        let hash = self.table.hash(&key);
        if let Some(idx) = self.table.find(&key, hash) {
            let previous = self
                .table
                .value_mut(idx)
                .map(|slot| mem::replace(slot, value));
            if relocate {
                self.table.move_to(idx, end);
            } else {
                self.table.touch();
            }
            return previous;
        }

        if self.table.is_full() {
            let opposite = match end {
                End::Front => End::Back,
                End::Back => End::Front,
            };
            self.table.evict(opposite);
        }
        self.table.attach(key, value, hash, end);
        None
    }

    /// Appends `key` at the back, or updates it in place if present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.upsert(key, value, End::Back, false)
    }

    /// Inserts or updates `key` and makes it the back entry.
    pub fn push_back(&mut self, key: K, value: V) -> Option<V> {
        self.upsert(key, value, End::Back, true)
    }

    /// Inserts or updates `key` and makes it the front entry.
    pub fn push_front(&mut self, key: K, value: V) -> Option<V> {
        self.upsert(key, value, End::Front, true)
    }

    fn pop(&mut self, end: End) -> TableResult<(K, V)> {
        let idx = self.table.end(end).ok_or(TableError::Empty)?;
        self.table
            .detach(idx)
            .map(|node| (node.key, node.value))
            .ok_or(TableError::Empty)
    }

    fn peek(&self, end: End) -> TableResult<(&K, &V)> {
        self.table
            .end(end)
            .and_then(|idx| self.table.node(idx))
            .map(|node| (&node.key, &node.value))
            .ok_or(TableError::Empty)
    }

    /// Removes and returns the front entry.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`] if the map is empty.
    pub fn pop_front(&mut self) -> TableResult<(K, V)> {
        self.pop(End::Front)
    }

    /// Removes and returns the back entry.
    ///
    /// # Errors
    ///
    /// [`TableError::Empty`] if the map is empty.
    pub fn pop_back(&mut self) -> TableResult<(K, V)> {
        self.pop(End::Back)
    }

    pub fn peek_front(&self) -> TableResult<(&K, &V)> {
        self.peek(End::Front)
    }

    pub fn peek_back(&self) -> TableResult<(&K, &V)> {
        self.peek(End::Back)
    }

    /// Moves `key` to the front. Returns `false` if it is absent.
    pub fn move_to_front(&mut self, key: &K) -> bool {
        self.move_key(key, End::Front)
    }

    /// Moves `key` to the back. Returns `false` if it is absent.
    pub fn move_to_back(&mut self, key: &K) -> bool {
        self.move_key(key, End::Back)
    }

    fn move_key(&mut self, key: &K, end: End) -> bool {
        match self.table.lookup(key) {
            Some(idx) => {
                self.table.move_to(idx, end);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.table.lookup(key)?;
        self.table.detach(idx).map(|node| node.value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let idx = self.table.lookup(key)?;
        self.table.node(idx).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.table.lookup(key)?;
        self.table.value_mut(idx)
    }

    /// Like [`get`](Self::get) but reports a miss as [`TableError::KeyNotFound`].
    pub fn require(&self, key: &K) -> TableResult<&V> {
        self.get(key).ok_or(TableError::KeyNotFound)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.table.lookup(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Initial size, or the maximum in fixed mode.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn mode(&self) -> CapacityMode {
        self.table.mode()
    }

    pub fn evictions(&self) -> u64 {
        self.table.evictions()
    }

    pub fn comparer_name(&self) -> &'static str {
        self.table.hasher().comparer_name()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Entries front to back. Reverse with `.rev()`.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Detached cursor positioned at the front.
    pub fn cursor(&self) -> Cursor {
        self.table.cursor()
    }

    /// Yields the next entry for `cursor`, front to back.
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
        self.table
            .advance(cursor, |node| (node.key.clone(), node.value.clone()))
    }
}

/// Front-to-back iterator over a [`LeiLinkedMap`].
pub struct Iter<'a, K, V> {
    inner: LinkedIter<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|node| (&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|node| (&node.key, &node.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a LeiLinkedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
