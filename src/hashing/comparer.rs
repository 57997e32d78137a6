//! Key comparers: the equality/hash capability injected into every container.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash, Hasher};

use fnv::FnvBuildHasher;

/// Equality and hashing for keys of type `K`.
///
/// Containers hold a comparer behind an `Arc<dyn KeyComparer<K>>`, so implementations
/// must be shareable across threads.
pub trait KeyComparer<K: ?Sized>: Send + Sync {
    /// Hash code for `key`. Containers mask it to 31 bits before indexing.
    fn hash(&self, key: &K) -> u64;

    /// Whether `a` and `b` are the same key.
    fn equals(&self, a: &K, b: &K) -> bool;

    /// Short label used in diagnostics.
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Natural equality with a deterministic FNV-1a hash.
#[derive(Debug, Clone, Default)]
pub struct NaturalComparer {
    build: FnvBuildHasher,
}

impl NaturalComparer {
    /// Creates the default comparer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K: Hash + Eq + ?Sized> KeyComparer<K> for NaturalComparer {
    fn hash(&self, key: &K) -> u64 {
        let mut hasher = self.build.build_hasher();
        key.hash(&mut hasher);
        hasher.finish()
    }

    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }

    fn name(&self) -> &'static str {
        "natural"
    }
}

/// Natural equality with SipHash keyed randomly per instance.
///
/// Two `SecureComparer`s hash the same key differently, so an attacker who controls keys
/// cannot precompute a set that collides in every container.
#[derive(Debug, Clone, Default)]
pub struct SecureComparer {
    state: RandomState,
}

impl SecureComparer {
    /// Creates a comparer with fresh random keys.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K: Hash + Eq + ?Sized> KeyComparer<K> for SecureComparer {
    fn hash(&self, key: &K) -> u64 {
        let mut hasher = self.state.build_hasher();
        key.hash(&mut hasher);
        hasher.finish()
    }

    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }

    fn name(&self) -> &'static str {
        "secure"
    }
}
