// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Index-addressed node storage with a free-list.
//!
//! Nodes are addressed by plain `usize` indices so that hash-chain links and ordering
//! links can both point at the same node without shared ownership. Freed indices are
//! recycled before the backing vector grows.

#[derive(Debug)]
pub(crate) struct NodeArena<N> {
    slots: Vec<Option<N>>,
    free: Vec<usize>,
    len: usize,
}

impl<N> NodeArena<N> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn insert(&mut self, node: N) -> usize {
        let idx = if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(node);
            idx
        } else {
            self.slots.push(Some(node));
            self.slots.len() - 1
        };
        self.len += 1;
        idx
    }

    pub(crate) fn remove(&mut self, idx: usize) -> Option<N> {
        let node = self.slots.get_mut(idx)?.take()?;
        self.free.push(idx);
        self.len -= 1;
        Some(node)
    }

    pub(crate) fn get(&self, idx: usize) -> Option<&N> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut N> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    /// Raw slot view handed to the chain index and ordering list.
    pub(crate) fn slots(&self) -> &[Option<N>] {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Option<N>] {
        &mut self.slots
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }
}
