// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Chained hash table whose nodes are also threaded on a doubly linked list.
//!
//! Every node carries two independent links: `chain_next` for its hash bucket and
//! `prev`/`next` for the ordering list. Each mutator here updates both structures
//! before returning, so the key set reachable through the index always equals the key
//! set reachable by walking the list.

use crate::data_structures::config::{CapacityMode, TableConfig};
use crate::data_structures::table::{
    ChainIndex, ChainLink, Cursor, LinkedOrder, NodeArena, OrderLink, Version,
};
use crate::error::TableResult;
use crate::hashing::KeyHasher;
use crate::sizing::{chained_bucket_count, next_prime};

#[derive(Debug)]
pub(crate) struct LinkedNode<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    hash: u32,
    chain_next: Option<usize>,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<K, V> ChainLink for LinkedNode<K, V> {
    fn chain_hash(&self) -> u32 {
        self.hash
    }

    fn chain_next(&self) -> Option<usize> {
        self.chain_next
    }

    fn set_chain_next(&mut self, next: Option<usize>) {
        self.chain_next = next;
    }
}

impl<K, V> OrderLink for LinkedNode<K, V> {
    fn prev(&self) -> Option<usize> {
        self.prev
    }

    fn next(&self) -> Option<usize> {
        self.next
    }

    fn set_prev(&mut self, prev: Option<usize>) {
        self.prev = prev;
    }

    fn set_next(&mut self, next: Option<usize>) {
        self.next = next;
    }
}

/// End of the ordering list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum End {
    Front,
    Back,
}

#[derive(Debug)]
pub(crate) struct LinkedTable<K, V> {
    arena: NodeArena<LinkedNode<K, V>>,
    index: ChainIndex,
    order: LinkedOrder,
    hasher: KeyHasher<K>,
    load_factor: f64,
    mode: CapacityMode,
    capacity: usize,
    evictions: u64,
    version: Version,
}

impl<K, V> LinkedTable<K, V> {
    /// `config` must already be validated.
    pub(crate) fn new(config: &TableConfig, hasher: KeyHasher<K>) -> Self {
        let reserve = match config.mode {
            CapacityMode::Fixed => config.capacity,
            CapacityMode::Dynamic => config.capacity.min(1 << 16),
        };
        Self {
            arena: NodeArena::with_capacity(reserve),
            index: ChainIndex::with_buckets(chained_bucket_count(
                config.capacity,
                config.load_factor,
            )),
            order: LinkedOrder::default(),
            hasher,
            load_factor: config.load_factor,
            mode: config.mode,
            capacity: config.capacity,
            evictions: 0,
            version: Version::default(),
        }
    }

    pub(crate) fn hash(&self, key: &K) -> u32 {
        self.hasher.hash(key)
    }

    pub(crate) fn hasher(&self) -> &KeyHasher<K> {
        &self.hasher
    }

    pub(crate) fn find(&self, key: &K, hash: u32) -> Option<usize> {
        let (found, visited) = self
            .index
            .find(self.arena.slots(), hash, |node| self.hasher.equals(&node.key, key));
        self.hasher.record_probes(visited);
        found
    }

    pub(crate) fn lookup(&self, key: &K) -> Option<usize> {
        self.find(key, self.hash(key))
    }

    pub(crate) fn node(&self, idx: usize) -> Option<&LinkedNode<K, V>> {
        self.arena.get(idx)
    }

    pub(crate) fn value_mut(&mut self, idx: usize) -> Option<&mut V> {
        self.arena.get_mut(idx).map(|node| &mut node.value)
    }

    pub(crate) fn end(&self, end: End) -> Option<usize> {
        match end {
            End::Front => self.order.head(),
            End::Back => self.order.tail(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.arena.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn mode(&self) -> CapacityMode {
        self.mode
    }

    pub(crate) fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Whether one more key would exceed a fixed capacity.
    pub(crate) fn is_full(&self) -> bool {
        self.mode == CapacityMode::Fixed && self.arena.len() >= self.capacity
    }

    /// Links a new node at `end` and returns its index.
    pub(crate) fn attach(&mut self, key: K, value: V, hash: u32, end: End) -> usize {
        let idx = self.arena.insert(LinkedNode {
            key,
            value,
            hash,
            chain_next: None,
            prev: None,
            next: None,
        });
        let slots = self.arena.slots_mut();
        self.index.link(slots, idx);
        match end {
            End::Front => self.order.push_front(slots, idx),
            End::Back => self.order.push_back(slots, idx),
        }
        self.version.bump();
        self.grow_index_if_needed();
        idx
    }

    /// Unlinks the node at `idx` from both structures and frees it.
    pub(crate) fn detach(&mut self, idx: usize) -> Option<LinkedNode<K, V>> {
        let slots = self.arena.slots_mut();
        self.order.detach(slots, idx);
        self.index.unlink(slots, idx);
        let node = self.arena.remove(idx)?;
        self.version.bump();
        Some(node)
    }

    /// Detaches the node at `end` because a fixed capacity was reached.
    pub(crate) fn evict(&mut self, end: End) -> Option<LinkedNode<K, V>> {
        let idx = self.end(end)?;
        let node = self.detach(idx)?;
        self.evictions += 1;
        tracing::trace!(slot = idx, end = ?end, "Evicted entry at capacity");
        Some(node)
    }

    pub(crate) fn move_to(&mut self, idx: usize, end: End) {
        let slots = self.arena.slots_mut();
        match end {
            End::Front => self.order.move_to_front(slots, idx),
            End::Back => self.order.move_to_back(slots, idx),
        }
        self.version.bump();
    }

    /// Records an in-place update that did not change the structure.
    pub(crate) fn touch(&mut self) {
        self.version.bump();
    }

    fn grow_index_if_needed(&mut self) {
        let buckets = self.index.bucket_count();
        if (self.arena.len() as f64) <= buckets as f64 * self.load_factor {
            return;
        }
        let grown = next_prime(buckets.saturating_mul(2));
        self.index.rebuild(grown, self.arena.slots_mut());
        tracing::debug!(from = buckets, to = grown, "Chained index grown");
    }

    pub(crate) fn clear(&mut self) {
        self.arena.clear();
        self.index.clear();
        self.order.clear();
        self.version.bump();
    }

    pub(crate) fn iter(&self) -> LinkedIter<'_, K, V> {
        LinkedIter {
            slots: self.arena.slots(),
            front: self.order.head(),
            back: self.order.tail(),
            remaining: self.arena.len(),
        }
    }

    pub(crate) fn cursor(&self) -> Cursor {
        Cursor::new(self.version, self.order.head(), self.arena.len())
    }

    /// Steps `cursor` front to back, mapping the yielded node through `f`.
    pub(crate) fn advance<T, F>(&self, cursor: &mut Cursor, f: F) -> TableResult<Option<T>>
    where
        F: FnOnce(&LinkedNode<K, V>) -> T,
    {
        cursor.check(self.version)?;
        if cursor.is_finished() {
            return Ok(None);
        }
        let Some(node) = cursor.position().and_then(|idx| self.arena.get(idx)) else {
            cursor.finish();
            return Ok(None);
        };
        cursor.step(node.next);
        Ok(Some(f(node)))
    }
}

/// Double-ended iterator over a linked table in list order.
pub(crate) struct LinkedIter<'a, K, V> {
    slots: &'a [Option<LinkedNode<K, V>>],
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for LinkedIter<'a, K, V> {
    type Item = &'a LinkedNode<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let slots = self.slots;
        let node = self.front.and_then(|idx| slots.get(idx)?.as_ref())?;
        self.front = node.next;
        self.remaining -= 1;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for LinkedIter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let slots = self.slots;
        let node = self.back.and_then(|idx| slots.get(idx)?.as_ref())?;
        self.back = node.prev;
        self.remaining -= 1;
        Some(node)
    }
}

impl<K, V> ExactSizeIterator for LinkedIter<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::HashingPolicy;

    fn table(config: TableConfig) -> LinkedTable<u32, &'static str> {
        let hasher = KeyHasher::from_policy(&HashingPolicy::new());
        LinkedTable::new(&config, hasher)
    }

    fn keys(table: &LinkedTable<u32, &'static str>) -> Vec<u32> {
        table.iter().map(|node| node.key).collect()
    }

    #[test]
    fn test_attach_both_ends_and_lookup() {
        let mut t = table(TableConfig::default());
        for key in [1, 2, 3] {
            let hash = t.hash(&key);
            t.attach(key, "v", hash, End::Back);
        }
        let hash = t.hash(&0);
        t.attach(0, "front", hash, End::Front);

        assert_eq!(keys(&t), vec![0, 1, 2, 3]);
        assert_eq!(t.iter().rev().map(|n| n.key).collect::<Vec<_>>(), vec![3, 2, 1, 0]);
        assert!(t.lookup(&2).is_some());
        assert!(t.lookup(&7).is_none());
    }

    #[test]
    fn test_detach_keeps_index_and_list_in_sync() {
        let mut t = table(TableConfig::default());
        for key in 0..5 {
            let hash = t.hash(&key);
            t.attach(key, "v", hash, End::Back);
        }
        let idx = t.lookup(&2).unwrap();
        assert_eq!(t.detach(idx).map(|n| n.key), Some(2));
        assert!(t.lookup(&2).is_none());
        assert_eq!(keys(&t), vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_index_grows_past_load_factor() {
        let mut t = table(TableConfig::new().with_capacity(2));
        let before = t.index.bucket_count();
        for key in 0..200 {
            let hash = t.hash(&key);
            t.attach(key, "v", hash, End::Back);
        }
        assert!(t.index.bucket_count() > before);
        for key in 0..200 {
            assert!(t.lookup(&key).is_some());
        }
    }

    #[test]
    fn test_evict_counts() {
        let mut t = table(TableConfig::fixed(2));
        for key in 0..2 {
            let hash = t.hash(&key);
            t.attach(key, "v", hash, End::Back);
        }
        assert!(t.is_full());
        assert_eq!(t.evict(End::Front).map(|n| n.key), Some(0));
        assert_eq!(t.evictions(), 1);
        assert!(!t.is_full());
    }
}
