//! Hashing policy for the hash-indexed containers.
//!
//! A container never hashes keys itself. It resolves a [`KeyHasher`] at construction
//! from a [`HashingPolicy`] and an optional explicit [`KeyComparer`]:
//!
//! - an explicit comparer always wins;
//! - otherwise a randomized policy selects [`SecureComparer`] (per-instance keys,
//!   defending against hash flooding on attacker-controlled keys);
//! - otherwise [`NaturalComparer`] is used.
//!
//! # Example
//!
//! ```
//! use mauka_tables::hashing::{HashingPolicy, KeyHasher};
//!
//! let policy = HashingPolicy::secure().with_collision_threshold(8);
//! let hasher = KeyHasher::<String>::from_policy(&policy);
//! assert!(hasher.is_randomized());
//! assert!(hasher.hash(&"kona".to_string()) <= 0x7FFF_FFFF);
//! ```

mod comparer;
mod monitor;

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

pub use comparer::{KeyComparer, NaturalComparer, SecureComparer};
pub use monitor::{CollisionCallback, CollisionMonitor, CollisionReport, CollisionStats};

use crate::error::{TableError, TableResult};

/// Collision threshold applied by [`HashingPolicy::secure`].
pub const DEFAULT_COLLISION_THRESHOLD: usize = 100;

/// Masks a 64-bit hash code to a non-negative 31-bit value, folding the high half in.
#[inline]
pub fn mask_hash(hash: u64) -> u32 {
    ((hash ^ (hash >> 32)) as u32) & 0x7FFF_FFFF
}

/// Randomized-hashing toggle plus optional collision-chain monitoring.
#[derive(Clone, Default)]
pub struct HashingPolicy {
    randomized: bool,
    collision_threshold: Option<usize>,
    on_collision: Option<CollisionCallback>,
}

impl HashingPolicy {
    /// Deterministic hashing, no monitoring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Randomized hashing with monitoring at [`DEFAULT_COLLISION_THRESHOLD`].
    pub fn secure() -> Self {
        Self {
            randomized: true,
            collision_threshold: Some(DEFAULT_COLLISION_THRESHOLD),
            on_collision: None,
        }
    }

    /// Enables or disables randomized hashing.
    pub fn with_randomized(mut self, randomized: bool) -> Self {
        self.randomized = randomized;
        self
    }

    /// Reports lookups whose chain is longer than `threshold`.
    pub fn with_collision_threshold(mut self, threshold: usize) -> Self {
        self.collision_threshold = Some(threshold);
        self
    }

    /// Installs the callback invoked past the collision threshold.
    ///
    /// The callback runs on the thread that did the lookup. [`MoanaLruCache`] calls it
    /// after releasing its locks, so the callback may use the cache it is attached to.
    ///
    /// [`MoanaLruCache`]: crate::data_structures::MoanaLruCache
    pub fn with_collision_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&CollisionReport) + Send + Sync + 'static,
    {
        self.on_collision = Some(Arc::new(callback));
        self
    }

    /// Whether randomized hashing was requested.
    pub fn is_randomized(&self) -> bool {
        self.randomized
    }

    /// The configured collision threshold, if monitoring is enabled.
    pub fn collision_threshold(&self) -> Option<usize> {
        self.collision_threshold
    }

    /// Validates the policy.
    ///
    /// # Errors
    ///
    /// A zero collision threshold is rejected.
    pub fn validate(&self) -> TableResult<()> {
        if self.collision_threshold == Some(0) {
            return Err(TableError::invalid_argument(
                "collision_threshold",
                "must be greater than 0",
            ));
        }
        Ok(())
    }

    fn monitor(&self) -> Option<CollisionMonitor> {
        self.collision_threshold
            .map(|threshold| CollisionMonitor::new(threshold, self.on_collision.clone()))
    }
}

impl fmt::Debug for HashingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashingPolicy")
            .field("randomized", &self.randomized)
            .field("collision_threshold", &self.collision_threshold)
            .field("has_callback", &self.on_collision.is_some())
            .finish()
    }
}

/// Resolved hashing capability owned by a container.
pub struct KeyHasher<K: ?Sized> {
    comparer: Arc<dyn KeyComparer<K>>,
    monitor: Option<CollisionMonitor>,
    randomized: bool,
}

impl<K: ?Sized> KeyHasher<K> {
    /// Resolves the default comparer for `policy`.
    pub fn from_policy(policy: &HashingPolicy) -> Self
    where
        K: Hash + Eq,
    {
        let comparer: Arc<dyn KeyComparer<K>> = if policy.randomized {
            Arc::new(SecureComparer::new())
        } else {
            Arc::new(NaturalComparer::new())
        };
        Self {
            comparer,
            monitor: policy.monitor(),
            randomized: policy.randomized,
        }
    }

    /// Uses `comparer` regardless of the policy's randomized toggle.
    pub fn with_comparer(policy: &HashingPolicy, comparer: Arc<dyn KeyComparer<K>>) -> Self {
        if policy.randomized {
            tracing::debug!(
                comparer = comparer.name(),
                "Explicit comparer supplied; randomized hashing request ignored"
            );
        }
        Self {
            comparer,
            monitor: policy.monitor(),
            randomized: false,
        }
    }

    /// Masked 31-bit hash of `key`.
    #[inline]
    pub fn hash(&self, key: &K) -> u32 {
        mask_hash(self.comparer.hash(key))
    }

    /// Key equality through the comparer.
    #[inline]
    pub fn equals(&self, a: &K, b: &K) -> bool {
        self.comparer.equals(a, b)
    }

    /// Records the chain length walked by one lookup.
    #[inline]
    pub fn record_probes(&self, chain_length: usize) {
        if let Some(monitor) = &self.monitor {
            monitor.record(chain_length);
        }
    }

    /// Whether the secure comparer was substituted by the policy.
    pub fn is_randomized(&self) -> bool {
        self.randomized
    }

    /// Name of the active comparer.
    pub fn comparer_name(&self) -> &'static str {
        self.comparer.name()
    }

    /// Collision counters, if monitoring is enabled.
    pub fn collision_stats(&self) -> Option<CollisionStats> {
        self.monitor.as_ref().map(CollisionMonitor::stats)
    }
}

impl<K: ?Sized> fmt::Debug for KeyHasher<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyHasher")
            .field("comparer", &self.comparer.name())
            .field("randomized", &self.randomized)
            .field("monitor", &self.monitor)
            .finish()
    }
}
