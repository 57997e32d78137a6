// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Ring slot node for Nalu Circular Map.

use crate::data_structures::table::ChainLink;

/// An occupied ring slot.
#[derive(Debug)]
pub(crate) struct RingNode<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u32,
    pub(crate) chain_next: Option<usize>,
    /// Logical time of the last insert or update
    pub(crate) stamp: u64,
}

impl<K, V> ChainLink for RingNode<K, V> {
    #[inline]
    fn chain_hash(&self) -> u32 {
        self.hash
    }

    #[inline]
    fn chain_next(&self) -> Option<usize> {
        self.chain_next
    }

    #[inline]
    fn set_chain_next(&mut self, next: Option<usize>) {
        self.chain_next = next;
    }
}
