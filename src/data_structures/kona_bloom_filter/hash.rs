// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Probe-position derivation for Kona Bloom Filter.
//!
//! A key is reduced once to a 64-bit fingerprint (FNV-1a over its `Hash` impl).
//! Two independent avalanche mixes of that fingerprint give `h1` and `h2`, and probe
//! `i` lands on bit `(h1 + i * h2) mod m` (Kirsch-Mitzenmacher double hashing).

use std::hash::{Hash, Hasher};

use fnv::FnvHasher;

/// Offset XORed into the fingerprint before the second mix.
const SECOND_MIX_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// FNV-1a fingerprint of `value`.
pub(crate) fn fingerprint<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FnvHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

/// MurmurHash3 64-bit finalizer.
#[inline]
pub(crate) fn mix64(mut h: u64) -> u64 {
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^= h >> 33;
    h
}

/// Iterator over the `hash_count` bit positions of one key.
#[derive(Debug, Clone)]
pub(crate) struct ProbeSequence {
    h1: u64,
    h2: u64,
    bit_count: u64,
    index: u32,
    hash_count: u32,
}

impl ProbeSequence {
    pub(crate) fn new(hash: u64, hash_count: u32, bit_count: usize) -> Self {
        Self {
            h1: mix64(hash),
            // odd step so consecutive probes never collapse onto one bit when m is even
            h2: mix64(hash ^ SECOND_MIX_SEED) | 1,
            bit_count: bit_count.max(1) as u64,
            index: 0,
            hash_count,
        }
    }
}

impl Iterator for ProbeSequence {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.index >= self.hash_count {
            return None;
        }
        let combined = self
            .h1
            .wrapping_add(u64::from(self.index).wrapping_mul(self.h2));
        self.index += 1;
        Some((combined % self.bit_count) as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.hash_count - self.index) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ProbeSequence {}
