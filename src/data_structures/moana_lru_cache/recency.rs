// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Recency list for Moana LRU Cache.
//!
//! Most recently used at the head, eviction candidate at the tail. Nodes carry a
//! copy of key and value so that snapshots can be taken under the list lock alone.

use crate::data_structures::table::{LinkedOrder, NodeArena, OrderLink};

#[derive(Debug)]
pub(crate) struct RecencyNode<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u32,
    /// Matches the owning bucket entry's stamp while the binding is current
    pub(crate) stamp: u64,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<K, V> RecencyNode<K, V> {
    pub(crate) fn new(key: K, value: V, hash: u32, stamp: u64) -> Self {
        Self {
            key,
            value,
            hash,
            stamp,
            prev: None,
            next: None,
        }
    }
}

impl<K, V> OrderLink for RecencyNode<K, V> {
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

/// Identity of the current eviction candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Victim {
    pub(crate) node: usize,
    pub(crate) hash: u32,
    pub(crate) stamp: u64,
}

#[derive(Debug)]
pub(crate) struct RecencyList<K, V> {
    arena: NodeArena<RecencyNode<K, V>>,
    order: LinkedOrder,
}

impl<K, V> RecencyList<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: NodeArena::with_capacity(capacity),
            order: LinkedOrder::default(),
        }
    }

    pub(crate) fn push_front(&mut self, node: RecencyNode<K, V>) -> usize {
        let idx = self.arena.insert(node);
        self.order.push_front(self.arena.slots_mut(), idx);
        idx
    }

    /// Restamps `idx`, optionally replaces its value, and moves it to the head.
    pub(crate) fn promote(&mut self, idx: usize, stamp: u64, value: Option<V>) {
        let Some(node) = self.arena.get_mut(idx) else {
            return;
        };
        node.stamp = stamp;
        if let Some(value) = value {
            node.value = value;
        }
        self.order.move_to_front(self.arena.slots_mut(), idx);
    }

    /// Restamps `idx` and moves it to its place by stamp.
    ///
    /// The list is kept in descending stamp order, so the node lands behind the last
    /// node stamped later than `stamp`.
    pub(crate) fn reposition(&mut self, idx: usize, stamp: u64) {
        let Some(node) = self.arena.get_mut(idx) else {
            return;
        };
        node.stamp = stamp;
        self.order.detach(self.arena.slots_mut(), idx);

        let slots = self.arena.slots();
        let mut anchor = self.order.tail();
        while let Some(candidate) = anchor {
            match slots.get(candidate).and_then(Option::as_ref) {
                Some(node) if node.stamp < stamp => {
                    anchor = LinkedOrder::prev_of(slots, candidate);
                }
                _ => break,
            }
        }
        match anchor {
            Some(anchor) => self.order.insert_after(self.arena.slots_mut(), anchor, idx),
            None => self.order.push_front(self.arena.slots_mut(), idx),
        }
    }

    pub(crate) fn victim(&self) -> Option<Victim> {
        let idx = self.order.tail()?;
        self.arena.get(idx).map(|node| Victim {
            node: idx,
            hash: node.hash,
            stamp: node.stamp,
        })
    }

    pub(crate) fn remove(&mut self, idx: usize) -> Option<RecencyNode<K, V>> {
        self.order.detach(self.arena.slots_mut(), idx);
        self.arena.remove(idx)
    }

    pub(crate) fn get(&self, idx: usize) -> Option<&RecencyNode<K, V>> {
        self.arena.get(idx)
    }

    pub(crate) fn len(&self) -> usize {
        self.arena.len()
    }

    pub(crate) fn clear(&mut self) {
        self.arena.clear();
        self.order.clear();
    }

    /// Nodes from most to least recently used.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &RecencyNode<K, V>> + '_ {
        let slots = self.arena.slots();
        let mut cursor = self.order.head();
        std::iter::from_fn(move || {
            let idx = cursor?;
            cursor = LinkedOrder::next_of(slots, idx);
            slots.get(idx)?.as_ref()
        })
    }
}
